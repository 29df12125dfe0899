use dialdex_core::domain::Partner;

use crate::Result;

/// Narrow seam over the remote contact store so the directory build can be
/// exercised without a live endpoint.
pub trait PartnerSource {
    fn source_name(&self) -> &'static str;
    fn fetch_partners(&self) -> Result<Vec<Partner>>;
}
