pub mod audit_logs;
pub mod cart_items;
pub mod domain_extensions;
pub mod invoices;
pub mod order_items;
pub mod orders;
pub mod payment_references;
pub mod products;
pub mod users;

pub use audit_logs::Entity as AuditLogs;
pub use cart_items::Entity as CartItems;
pub use domain_extensions::Entity as DomainExtensions;
pub use invoices::Entity as Invoices;
pub use order_items::Entity as OrderItems;
pub use orders::Entity as Orders;
pub use payment_references::Entity as PaymentReferences;
pub use products::Entity as Products;
pub use users::Entity as Users;
