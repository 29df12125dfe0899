use std::collections::HashSet;

use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::domain::partner::Partner;
use crate::domain::phone::normalize_phone;

/// Deduplicated normalized-phone -> contact-name mapping. Keys keep
/// insertion order; the first name seen for a key wins.
#[derive(Debug, Clone, Default)]
pub struct PhoneDirectory {
    entries: Vec<(String, String)>,
    seen: HashSet<String>,
}

impl PhoneDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts unless the key is already present. Returns whether the
    /// entry was added.
    pub fn insert(&mut self, phone: String, name: &str) -> bool {
        if self.seen.contains(&phone) {
            return false;
        }
        self.seen.insert(phone.clone());
        self.entries.push((phone, name.to_string()));
        true
    }

    /// Both candidate fields are always attempted, so one record can
    /// contribute two entries.
    pub fn add_partner(&mut self, partner: &Partner) {
        for candidate in partner.phone_candidates().into_iter().flatten() {
            if let Some(phone) = normalize_phone(candidate) {
                self.insert(phone, &partner.name);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(phone, name)| (phone.as_str(), name.as_str()))
    }
}

impl Serialize for PhoneDirectory {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (phone, name) in &self.entries {
            map.serialize_entry(phone, name)?;
        }
        map.end()
    }
}

pub fn build_directory(partners: &[Partner]) -> PhoneDirectory {
    let mut directory = PhoneDirectory::new();
    for partner in partners {
        directory.add_partner(partner);
    }
    directory
}

#[cfg(test)]
mod tests {
    use super::{build_directory, PhoneDirectory};
    use crate::domain::partner::Partner;

    fn partner(name: &str, sanitized: Option<&str>, phone: Option<&str>) -> Partner {
        Partner {
            name: name.to_string(),
            phone: phone.map(str::to_string),
            phone_sanitized: sanitized.map(str::to_string),
        }
    }

    #[test]
    fn first_name_wins_for_duplicate_keys() {
        let partners = vec![
            partner("Amal", Some("92345678"), None),
            partner("Basma", None, Some("+968 9234 5678")),
        ];
        let directory = build_directory(&partners);
        let entries: Vec<_> = directory.iter().collect();
        assert_eq!(entries, vec![("96892345678", "Amal")]);
    }

    #[test]
    fn both_fields_of_one_record_can_insert_two_entries() {
        let partners = vec![partner("Amal", Some("92345678"), Some("92345679"))];
        let directory = build_directory(&partners);
        let entries: Vec<_> = directory.iter().collect();
        assert_eq!(
            entries,
            vec![("96892345678", "Amal"), ("96892345679", "Amal")]
        );
    }

    #[test]
    fn sanitized_field_is_tried_before_raw() {
        let partners = vec![partner("Amal", Some("24601234"), Some("92345678"))];
        let directory = build_directory(&partners);
        let entries: Vec<_> = directory.iter().collect();
        assert_eq!(
            entries,
            vec![("96824601234", "Amal"), ("96892345678", "Amal")]
        );
    }

    #[test]
    fn missing_and_empty_fields_contribute_nothing() {
        let partners = vec![partner("Amal", None, Some("")), partner("Basma", None, None)];
        let directory = build_directory(&partners);
        assert!(directory.is_empty());
    }

    #[test]
    fn insert_reports_duplicates() {
        let mut directory = PhoneDirectory::new();
        assert!(directory.insert("96892345678".to_string(), "Amal"));
        assert!(!directory.insert("96892345678".to_string(), "Basma"));
        assert_eq!(directory.len(), 1);
    }

    #[test]
    fn empty_set_serializes_as_empty_object() {
        let json = serde_json::to_string(&PhoneDirectory::new()).expect("serialize");
        assert_eq!(json, "{}");
    }

    #[test]
    fn serialization_preserves_insertion_order() {
        let partners = vec![
            partner("Amal", Some("92345678"), None),
            partner("Basma", Some("24601234"), None),
        ];
        let json = serde_json::to_string(&build_directory(&partners)).expect("serialize");
        assert_eq!(json, r#"{"96892345678":"Amal","96824601234":"Basma"}"#);
    }
}
