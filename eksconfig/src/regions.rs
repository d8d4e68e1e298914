//! Known AWS regions and their airport codes.

/// Region code to airport code, sorted by region.
const REGIONS: &[(&str, &str)] = &[
    ("af-south-1", "CPT"),
    ("ap-east-1", "HKG"),
    ("ap-northeast-1", "NRT"),
    ("ap-northeast-2", "ICN"),
    ("ap-northeast-3", "KIX"),
    ("ap-south-1", "BOM"),
    ("ap-southeast-1", "SIN"),
    ("ap-southeast-2", "SYD"),
    ("ca-central-1", "YUL"),
    ("cn-north-1", "BJS"),
    ("cn-northwest-1", "ZHY"),
    ("eu-central-1", "FRA"),
    ("eu-north-1", "ARN"),
    ("eu-south-1", "MXP"),
    ("eu-west-1", "DUB"),
    ("eu-west-2", "LHR"),
    ("eu-west-3", "CDG"),
    ("me-south-1", "BAH"),
    ("sa-east-1", "GRU"),
    ("us-east-1", "IAD"),
    ("us-east-2", "CMH"),
    ("us-gov-east-1", "OSU"),
    ("us-gov-west-1", "PDT"),
    ("us-west-1", "SFO"),
    ("us-west-2", "PDX"),
];

/// Returns the airport code for a known region.
///
/// # Examples
///
/// ```
/// use eksconfig::regions::airport_code;
///
/// assert_eq!(airport_code("us-west-2"), Some("PDX"));
/// assert_eq!(airport_code("mars-north-1"), None);
/// ```
#[must_use]
pub fn airport_code(region: &str) -> Option<&'static str> {
    REGIONS
        .binary_search_by(|(r, _)| (*r).cmp(region))
        .ok()
        .map(|i| REGIONS[i].1)
}

/// Whether the region is one the validator accepts.
#[must_use]
pub fn is_known(region: &str) -> bool {
    airport_code(region).is_some()
}

/// All known region codes.
pub fn all() -> impl Iterator<Item = &'static str> {
    REGIONS.iter().map(|(r, _)| *r)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_is_sorted() {
        let regions: Vec<_> = all().collect();
        let mut sorted = regions.clone();
        sorted.sort_unstable();
        assert_eq!(regions, sorted);
    }

    #[test]
    fn test_every_region_resolves() {
        for region in all() {
            assert!(is_known(region), "{region}");
        }
    }

    #[test]
    fn test_unknown_region() {
        assert!(!is_known(""));
        assert!(!is_known("US-WEST-2"));
    }
}
