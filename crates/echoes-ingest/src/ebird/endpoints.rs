//! eBird endpoint URL builders
//!
//! Query parameters are attached by the client.

/// Species codes recorded in a region: `/product/spplist/{regionCode}`
pub fn species_list_url(base_url: &str, region_code: &str) -> String {
    format!("{}/product/spplist/{}", trim_base(base_url), region_code)
}

/// Full eBird taxonomy: `/ref/taxonomy/ebird`
pub fn taxonomy_url(base_url: &str) -> String {
    format!("{}/ref/taxonomy/ebird", trim_base(base_url))
}

/// Recent nearby observations: `/data/obs/geo/recent`
pub fn recent_observations_url(base_url: &str) -> String {
    format!("{}/data/obs/geo/recent", trim_base(base_url))
}

fn trim_base(base_url: &str) -> &str {
    base_url.trim_end_matches('/')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_species_list_url() {
        let url = species_list_url("https://api.ebird.org/v2", "DK");
        assert_eq!(url, "https://api.ebird.org/v2/product/spplist/DK");
    }

    #[test]
    fn test_taxonomy_url_trims_trailing_slash() {
        let url = taxonomy_url("https://api.ebird.org/v2/");
        assert_eq!(url, "https://api.ebird.org/v2/ref/taxonomy/ebird");
    }

    #[test]
    fn test_recent_observations_url() {
        let url = recent_observations_url("http://localhost:9999");
        assert_eq!(url, "http://localhost:9999/data/obs/geo/recent");
    }
}
