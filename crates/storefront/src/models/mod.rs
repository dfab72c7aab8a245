//! Domain models for the storefront.
//!
//! These are the in-memory records owned by the services. Cart lines and
//! order lines carry their own copies of catalog data; nothing here holds a
//! reference back into the catalog.

pub mod cart;
pub mod contact;
pub mod order;
pub mod otp;
pub mod plant;
pub mod user;

pub use cart::{CartLine, CartView, MAX_LINE_QUANTITY};
pub use contact::ContactMessage;
pub use order::{
    CustomerInfo, CustomerInput, Order, OrderDraft, OrderItemInput, OrderLine, ShippingAddress,
    ShippingAddressInput,
};
pub use otp::OtpRecord;
pub use plant::{CareLevel, Plant, PlantCategory};
pub use user::{PendingRegistration, User};
