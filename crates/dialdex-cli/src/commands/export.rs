use anyhow::{Context as _, Result};
use tracing::debug;

use crate::commands::print_json;
use dialdex_config::AppConfig;
use dialdex_core::domain::{build_directory, PhoneDirectory};
use dialdex_rpc::{OdooClient, PartnerSource};

pub fn run(config: &AppConfig) -> Result<()> {
    let endpoint = &config.endpoint;
    let client = OdooClient::new(
        &endpoint.url,
        endpoint.database.clone(),
        endpoint.user_id,
        endpoint.password.clone(),
        config.result_limit,
    )
    .with_context(|| format!("connect to {}", endpoint.url))?;

    let directory = fetch_directory(&client)?;
    print_json(&directory)
}

fn fetch_directory(source: &dyn PartnerSource) -> Result<PhoneDirectory> {
    let partners = source
        .fetch_partners()
        .with_context(|| format!("fetch partners from {}", source.source_name()))?;
    debug!(count = partners.len(), "partners fetched");
    Ok(build_directory(&partners))
}

#[cfg(test)]
mod tests {
    use super::fetch_directory;
    use dialdex_core::domain::Partner;
    use dialdex_rpc::{PartnerSource, Result as RpcResult};

    struct FakeSource {
        partners: Vec<Partner>,
    }

    impl PartnerSource for FakeSource {
        fn source_name(&self) -> &'static str {
            "fake"
        }

        fn fetch_partners(&self) -> RpcResult<Vec<Partner>> {
            Ok(self.partners.clone())
        }
    }

    #[test]
    fn fetch_directory_normalizes_and_dedupes() {
        let source = FakeSource {
            partners: vec![
                Partner {
                    name: "Amal".to_string(),
                    phone: Some("9234-5679".to_string()),
                    phone_sanitized: Some("+96892345678".to_string()),
                },
                Partner {
                    name: "Basma".to_string(),
                    phone: None,
                    phone_sanitized: Some("92345678".to_string()),
                },
            ],
        };

        let directory = fetch_directory(&source).expect("fetch");
        let entries: Vec<_> = directory.iter().collect();
        assert_eq!(
            entries,
            vec![("96892345678", "Amal"), ("96892345679", "Amal")]
        );
    }

    #[test]
    fn empty_source_yields_empty_directory() {
        let source = FakeSource { partners: vec![] };
        let directory = fetch_directory(&source).expect("fetch");
        assert!(directory.is_empty());
    }
}
