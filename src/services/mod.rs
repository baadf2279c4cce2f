/// Storefront services module
pub mod cart;
pub mod checkout;
pub mod hamper;
pub mod pricing;

pub use cart::CartStore;
pub use checkout::{CheckoutOrchestrator, CheckoutState, SubmitOutcome};
pub use hamper::HamperCustomizer;
pub use pricing::{PricingConfig, PricingEngine};
