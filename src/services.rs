pub mod auth;
pub mod cart_service;
pub mod order_service;
pub mod product_service;
pub mod tenancy_service;

pub use auth::AuthService;
pub use cart_service::CartService;
pub use order_service::OrderService;
pub use product_service::ProductService;
pub use tenancy_service::TenantService;
