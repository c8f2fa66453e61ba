pub mod user_repo;
pub use user_repo::UserRepository;
pub mod tenancy_repo;
pub use tenancy_repo::TenantRepository;
pub mod product_repo;
pub use product_repo::ProductRepository;
pub mod cart_repo;
pub use cart_repo::CartRepository;
pub mod order_repo;
pub use order_repo::OrderRepository;
