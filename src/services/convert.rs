//! Entity -> API model conversions shared across services.

use chrono::Utc;

use crate::{
    entity::{
        cart_items, domain_extensions, invoices, order_items, orders, payment_references,
        products, users,
    },
    models::{
        CartItem, DomainExtension, Invoice, Order, OrderItem, PaymentReference, Product, User,
    },
};

pub fn user_from_entity(model: users::Model) -> User {
    User {
        id: model.id,
        email: model.email,
        password_hash: model.password_hash,
        name: model.name,
        nif: model.nif,
        created_at: model.created_at.with_timezone(&Utc),
        role: model.role,
    }
}

pub fn product_from_entity(model: products::Model) -> Product {
    Product {
        id: model.id,
        name: model.name,
        description: model.description,
        price: model.price,
        category: model.category,
        active: model.active,
        created_at: model.created_at.with_timezone(&Utc),
    }
}

pub fn extension_from_entity(model: domain_extensions::Model) -> DomainExtension {
    DomainExtension {
        id: model.id,
        name: model.name,
        base_price: model.base_price,
        renewal_price: model.renewal_price,
    }
}

pub fn cart_item_from_entity(model: cart_items::Model) -> CartItem {
    CartItem {
        id: model.id,
        user_id: model.user_id,
        kind: model.kind,
        product_id: model.product_id,
        domain_name: model.domain_name,
        extension: model.extension,
        years: model.years,
        quantity: model.quantity,
        created_at: model.created_at.with_timezone(&Utc),
    }
}

pub fn order_from_entity(model: orders::Model) -> Order {
    Order {
        id: model.id,
        user_id: model.user_id,
        total_amount: model.total_amount,
        status: model.status,
        created_at: model.created_at.with_timezone(&Utc),
        updated_at: model.updated_at.with_timezone(&Utc),
    }
}

pub fn order_item_from_entity(model: order_items::Model) -> OrderItem {
    OrderItem {
        id: model.id,
        order_id: model.order_id,
        product_id: model.product_id,
        name: model.name,
        unit_price: model.unit_price,
        quantity: model.quantity,
        duration: model.duration,
        duration_unit: model.duration_unit,
        subtotal: model.subtotal,
        created_at: model.created_at.with_timezone(&Utc),
    }
}

pub fn invoice_from_entity(model: invoices::Model) -> Invoice {
    Invoice {
        id: model.id,
        order_id: model.order_id,
        invoice_number: model.invoice_number,
        status: model.status,
        due_date: model.due_date.with_timezone(&Utc),
        payment_reference: model.payment_reference,
        pdf_url: model.pdf_url,
        created_at: model.created_at.with_timezone(&Utc),
        updated_at: model.updated_at.with_timezone(&Utc),
    }
}

pub fn reference_from_entity(model: payment_references::Model) -> PaymentReference {
    PaymentReference {
        id: model.id,
        order_id: model.order_id,
        invoice_id: model.invoice_id,
        reference: model.reference,
        amount: model.amount,
        status: model.status,
        gateway_token: model.gateway_token,
        created_at: model.created_at.with_timezone(&Utc),
        updated_at: model.updated_at.with_timezone(&Utc),
    }
}
