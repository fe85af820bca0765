pub mod lookup;
pub mod sml;
pub mod smp;

pub use crate::domain::model::{
    BillingSupport, HostProbe, LookupReport, ParticipantId, SmlResolution, BIS_BILLING_CREDIT_NOTE,
    BIS_BILLING_INVOICE,
};
pub use crate::domain::ports::{ConfigProvider, HostResolver};
pub use crate::utils::error::Result;
