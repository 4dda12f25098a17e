use utoipa::{
    Modify, OpenApi,
    openapi::{
        self,
        OpenApi as OpenApiSpec,
        security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    },
};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    dto::{
        cart::{AddToCartRequest, CartList},
        domains::{DomainQuote, ExtensionList, QuoteQuery},
        invoices::{DocumentCustomer, DocumentLine, DocumentQuery, InvoiceDocument, InvoiceList},
        nif::NifValidateRequest,
        orders::{CheckoutRequest, CheckoutResponse, OrderList, OrderWithItems},
        payments::{CreateReferenceRequest, ReferenceCreated, ReferenceStatus, WebhookPayload},
        products::{CreateProductRequest, ProductList, UpdateProductRequest},
    },
    models::{CartItem, DomainExtension, Invoice, Order, OrderItem, PaymentReference, Product, User},
    nif::{NifCheck, NifKind},
    response::{ApiResponse, Meta},
    routes::{
        admin, auth, cart, domains, health, invoices, nif as nif_routes, orders, params, payments,
        products as product_routes, webhooks,
    },
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        auth::login,
        auth::register,
        product_routes::list_products,
        product_routes::get_product,
        domains::list_extensions,
        domains::quote,
        nif_routes::validate,
        cart::cart_list,
        cart::add_to_cart,
        cart::remove_from_cart,
        orders::list_orders,
        orders::checkout,
        orders::get_order,
        invoices::list_invoices,
        invoices::get_invoice,
        invoices::get_document,
        payments::create_reference,
        payments::get_reference,
        webhooks::appypay_callback,
        admin::list_all_orders,
        admin::get_order_admin,
        admin::update_order_status,
        admin::create_product,
        admin::update_product,
        admin::delete_product
    ),
    components(
        schemas(
            User,
            Product,
            DomainExtension,
            CartItem,
            Order,
            OrderItem,
            Invoice,
            PaymentReference,
            NifCheck,
            NifKind,
            NifValidateRequest,
            AddToCartRequest,
            CartList,
            QuoteQuery,
            DomainQuote,
            ExtensionList,
            CheckoutRequest,
            CheckoutResponse,
            OrderList,
            OrderWithItems,
            InvoiceList,
            InvoiceDocument,
            DocumentCustomer,
            DocumentLine,
            DocumentQuery,
            CreateReferenceRequest,
            ReferenceCreated,
            ReferenceStatus,
            WebhookPayload,
            CreateProductRequest,
            UpdateProductRequest,
            ProductList,
            admin::UpdateOrderStatusRequest,
            params::Pagination,
            params::ProductQuery,
            params::OrderListQuery,
            Meta,
            ApiResponse<Product>,
            ApiResponse<ProductList>,
            ApiResponse<OrderWithItems>,
            ApiResponse<OrderList>,
            ApiResponse<InvoiceDocument>,
            ApiResponse<ReferenceCreated>
        )
    ),
    security(
        ("bearer_auth" = [])
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Auth", description = "Authentication endpoints"),
        (name = "Products", description = "Hosting and email plan catalog"),
        (name = "Domains", description = "Domain extension pricing and quotes"),
        (name = "Nif", description = "Tax identifier validation"),
        (name = "Cart", description = "Cart endpoints"),
        (name = "Orders", description = "Order and checkout endpoints"),
        (name = "Invoices", description = "Invoice and document endpoints"),
        (name = "Payments", description = "Multicaixa payment references"),
        (name = "Webhooks", description = "Inbound gateway callbacks"),
        (name = "Admin", description = "Back-office endpoints"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
