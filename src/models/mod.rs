/// Domain model module
pub mod cart;
pub mod order;
pub mod product;

// Re-export the types that make up the public surface
pub use cart::{CartLineItem, PacketSelection};
pub use order::{
    CheckoutSource, CreatedOrder, CustomerDetails, OrderDraft, OrderStatus, OrderTotals,
    PaymentMethod, PaymentSession, PaymentSessionRequest,
};
pub use product::{HamperConfig, Product};
