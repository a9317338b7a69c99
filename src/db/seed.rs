//! Demo e-commerce database.
//!
//! Creates a small store catalog (customers, products, orders and related
//! tables) for trying sqlgate out. This is the only code path that writes to
//! a database; everything else opens connections read-only.

use crate::db::temporal::encode_temporal;
use crate::error::{Result, SqlGateError};
use chrono::{Duration, Local, NaiveDateTime, Timelike};
use sqlx::sqlite::{SqliteConnectOptions, SqliteConnection, SqliteJournalMode};
use sqlx::{ConnectOptions, Connection};
use std::path::Path;
use tracing::info;

const SCHEMA: &[&str] = &[
    r#"CREATE TABLE customers (
        id INTEGER PRIMARY KEY,
        first_name TEXT,
        last_name TEXT,
        email TEXT UNIQUE,
        phone TEXT,
        created_at TIMESTAMP,
        last_login TIMESTAMP,
        address TEXT,
        city TEXT,
        country TEXT,
        postal_code TEXT)"#,
    r#"CREATE TABLE categories (
        id INTEGER PRIMARY KEY,
        name TEXT UNIQUE,
        parent_id INTEGER,
        FOREIGN KEY(parent_id) REFERENCES categories(id))"#,
    r#"CREATE TABLE suppliers (
        id INTEGER PRIMARY KEY,
        company_name TEXT,
        contact_name TEXT,
        email TEXT,
        phone TEXT,
        address TEXT)"#,
    r#"CREATE TABLE products (
        id INTEGER PRIMARY KEY,
        name TEXT,
        description TEXT,
        sku TEXT UNIQUE,
        price REAL,
        category_id INTEGER,
        supplier_id INTEGER,
        stock_quantity INTEGER,
        created_at TIMESTAMP,
        updated_at TIMESTAMP,
        FOREIGN KEY(category_id) REFERENCES categories(id),
        FOREIGN KEY(supplier_id) REFERENCES suppliers(id))"#,
    r#"CREATE TABLE orders (
        id INTEGER PRIMARY KEY,
        customer_id INTEGER,
        order_date TIMESTAMP,
        total_amount REAL,
        status TEXT CHECK(status IN ('pending', 'processing', 'shipped', 'delivered', 'canceled')),
        payment_status TEXT CHECK(payment_status IN ('paid', 'unpaid', 'refunded')),
        FOREIGN KEY(customer_id) REFERENCES customers(id))"#,
    r#"CREATE TABLE order_details (
        id INTEGER PRIMARY KEY,
        order_id INTEGER,
        product_id INTEGER,
        quantity INTEGER,
        unit_price REAL,
        discount REAL DEFAULT 0,
        FOREIGN KEY(order_id) REFERENCES orders(id),
        FOREIGN KEY(product_id) REFERENCES products(id))"#,
    r#"CREATE TABLE payments (
        id INTEGER PRIMARY KEY,
        order_id INTEGER,
        amount REAL,
        payment_method TEXT,
        transaction_id TEXT,
        payment_date TIMESTAMP,
        FOREIGN KEY(order_id) REFERENCES orders(id))"#,
    r#"CREATE TABLE reviews (
        id INTEGER PRIMARY KEY,
        product_id INTEGER,
        customer_id INTEGER,
        rating INTEGER CHECK(rating BETWEEN 1 AND 5),
        comment TEXT,
        created_at TIMESTAMP,
        FOREIGN KEY(product_id) REFERENCES products(id),
        FOREIGN KEY(customer_id) REFERENCES customers(id))"#,
    r#"CREATE TABLE inventory (
        id INTEGER PRIMARY KEY,
        product_id INTEGER,
        quantity INTEGER,
        location TEXT,
        last_restocked TIMESTAMP,
        FOREIGN KEY(product_id) REFERENCES products(id))"#,
];

const CATEGORIES: &[(&str, Option<i64>)] = &[
    ("Electronics", None),
    ("Computers", Some(1)),
    ("Smartphones", Some(1)),
    ("Furniture", None),
    ("Chairs", Some(4)),
    ("Tables", Some(4)),
    ("Clothing", None),
];

const SUPPLIERS: &[(&str, &str, &str, &str, &str)] = &[
    ("Tech Corp", "John Techman", "john@techcorp.com", "555-1234", "123 Tech Street"),
    ("Furniture World", "Sarah Furnish", "sarah@furnworld.com", "555-5678", "456 Comfort Ave"),
    ("Fashion Ltd", "Emma Styles", "emma@fashionltd.com", "555-9012", "789 Trend Blvd"),
];

/// (name, description, sku, price, category_id, supplier_id, stock, days ago)
const PRODUCTS: &[(&str, &str, &str, f64, i64, i64, i64, i64)] = &[
    ("Premium Laptop", "High-end business laptop", "LT-1001", 1499.99, 2, 1, 50, 30),
    ("Gaming Smartphone", "Flagship gaming phone", "PH-2001", 899.99, 3, 1, 100, 20),
    ("Ergonomic Chair", "Office ergonomic chair", "CH-3001", 299.99, 5, 2, 200, 10),
    ("Designer T-Shirt", "Cotton premium t-shirt", "TS-4001", 49.99, 7, 3, 500, 5),
];

/// (first, last, email, phone, created days ago, last login hours ago, address, city, country, postal code)
#[allow(clippy::type_complexity)]
const CUSTOMERS: &[(&str, &str, &str, &str, i64, i64, &str, &str, &str, &str)] = &[
    ("John", "Doe", "john@example.com", "555-1111", 100, 2, "123 Main St", "New York", "USA", "10001"),
    ("Jane", "Smith", "jane@example.com", "555-2222", 80, 5, "456 Oak Ave", "London", "UK", "SW1A 1AA"),
    ("Bob", "Wilson", "bob@example.com", "555-3333", 60, 24, "789 Pine Rd", "Sydney", "Australia", "2000"),
];

struct DemoOrder {
    customer_id: i64,
    days_ago: i64,
    status: &'static str,
    payment_status: &'static str,
    /// (product_id, quantity)
    lines: &'static [(i64, i64)],
}

const ORDERS: &[DemoOrder] = &[
    DemoOrder { customer_id: 1, days_ago: 9, status: "shipped", payment_status: "paid", lines: &[(1, 1), (3, 2)] },
    DemoOrder { customer_id: 2, days_ago: 7, status: "processing", payment_status: "paid", lines: &[(2, 1)] },
    DemoOrder { customer_id: 3, days_ago: 5, status: "pending", payment_status: "unpaid", lines: &[(4, 5), (3, 1), (2, 1)] },
    DemoOrder { customer_id: 1, days_ago: 3, status: "shipped", payment_status: "paid", lines: &[(4, 2)] },
    DemoOrder { customer_id: 2, days_ago: 1, status: "pending", payment_status: "unpaid", lines: &[(1, 1), (4, 3)] },
];

/// (product_id, quantity, location, days since restock)
const INVENTORY: &[(i64, i64, &str, i64)] = &[
    (1, 50, "Warehouse A", 7),
    (2, 100, "Warehouse B", 14),
    (3, 200, "Warehouse C", 21),
    (4, 500, "Warehouse A", 3),
];

/// (product_id, customer_id, rating, comment, days ago)
const REVIEWS: &[(i64, i64, i64, &str, i64)] = &[
    (1, 1, 5, "Excellent performance!", 5),
    (2, 2, 4, "Great for gaming", 3),
    (3, 3, 5, "Very comfortable", 2),
    (4, 1, 4, "Good quality fabric", 1),
];

/// Creates the demo database at `path`.
///
/// Refuses to touch an existing file unless `force` is set, in which case
/// the file is replaced.
pub async fn seed_demo_database(path: &Path, force: bool) -> Result<()> {
    if path.exists() {
        if !force {
            return Err(SqlGateError::config(format!(
                "{} already exists; pass --force to replace it",
                path.display()
            )));
        }
        remove_database_files(path)?;
    }

    let mut conn = SqliteConnectOptions::new()
        .filename(path)
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .connect()
        .await
        .map_err(|e| {
            SqlGateError::connection(format!("Cannot create {}: {e}", path.display()))
        })?;

    let seeded = populate(&mut conn).await;
    if let Err(e) = conn.close().await {
        tracing::warn!("Failed to close database connection: {}", e);
    }
    seeded?;

    info!("Seeded demo database at {}", path.display());
    Ok(())
}

async fn populate(conn: &mut SqliteConnection) -> Result<()> {
    let now = now_seconds();
    let ago = |delta: Duration| encode_temporal(&(now - delta));

    let mut tx = conn.begin().await.map_err(seed_error)?;

    for ddl in SCHEMA {
        sqlx::query(ddl).execute(&mut *tx).await.map_err(seed_error)?;
    }

    for (name, parent_id) in CATEGORIES {
        sqlx::query("INSERT INTO categories (name, parent_id) VALUES (?, ?)")
            .bind(*name)
            .bind(*parent_id)
            .execute(&mut *tx)
            .await
            .map_err(seed_error)?;
    }

    for (company, contact, email, phone, address) in SUPPLIERS {
        sqlx::query(
            "INSERT INTO suppliers (company_name, contact_name, email, phone, address) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(*company)
        .bind(*contact)
        .bind(*email)
        .bind(*phone)
        .bind(*address)
        .execute(&mut *tx)
        .await
        .map_err(seed_error)?;
    }

    for (name, description, sku, price, category_id, supplier_id, stock, days) in PRODUCTS {
        sqlx::query(
            r#"INSERT INTO products
               (name, description, sku, price, category_id, supplier_id, stock_quantity, created_at)
               VALUES (?, ?, ?, ?, ?, ?, ?, ?)"#,
        )
        .bind(*name)
        .bind(*description)
        .bind(*sku)
        .bind(*price)
        .bind(*category_id)
        .bind(*supplier_id)
        .bind(*stock)
        .bind(ago(Duration::days(*days)))
        .execute(&mut *tx)
        .await
        .map_err(seed_error)?;
    }

    for (first, last, email, phone, created, login, address, city, country, postal) in CUSTOMERS {
        sqlx::query(
            r#"INSERT INTO customers
               (first_name, last_name, email, phone, created_at, last_login, address, city, country, postal_code)
               VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"#,
        )
        .bind(*first)
        .bind(*last)
        .bind(*email)
        .bind(*phone)
        .bind(ago(Duration::days(*created)))
        .bind(ago(Duration::hours(*login)))
        .bind(*address)
        .bind(*city)
        .bind(*country)
        .bind(*postal)
        .execute(&mut *tx)
        .await
        .map_err(seed_error)?;
    }

    for (index, order) in ORDERS.iter().enumerate() {
        let order_id = index as i64 + 1;
        let order_date = ago(Duration::days(order.days_ago));

        sqlx::query(
            r#"INSERT INTO orders (id, customer_id, order_date, total_amount, status, payment_status)
               VALUES (?, ?, ?, 0, ?, ?)"#,
        )
        .bind(order_id)
        .bind(order.customer_id)
        .bind(&order_date)
        .bind(order.status)
        .bind(order.payment_status)
        .execute(&mut *tx)
        .await
        .map_err(seed_error)?;

        for (product_id, quantity) in order.lines {
            sqlx::query(
                r#"INSERT INTO order_details (order_id, product_id, quantity, unit_price)
                   SELECT ?, id, ?, price FROM products WHERE id = ?"#,
            )
            .bind(order_id)
            .bind(*quantity)
            .bind(*product_id)
            .execute(&mut *tx)
            .await
            .map_err(seed_error)?;
        }

        sqlx::query(
            r#"UPDATE orders SET total_amount =
               (SELECT SUM(quantity * unit_price) FROM order_details WHERE order_id = ?)
               WHERE id = ?"#,
        )
        .bind(order_id)
        .bind(order_id)
        .execute(&mut *tx)
        .await
        .map_err(seed_error)?;

        if order.payment_status == "paid" {
            sqlx::query(
                r#"INSERT INTO payments (order_id, amount, payment_method, transaction_id, payment_date)
                   SELECT id, total_amount, 'card', ?, order_date FROM orders WHERE id = ?"#,
            )
            .bind(format!("TXN-{:05}", order_id))
            .bind(order_id)
            .execute(&mut *tx)
            .await
            .map_err(seed_error)?;
        }
    }

    for (product_id, quantity, location, days) in INVENTORY {
        sqlx::query(
            "INSERT INTO inventory (product_id, quantity, location, last_restocked) VALUES (?, ?, ?, ?)",
        )
        .bind(*product_id)
        .bind(*quantity)
        .bind(*location)
        .bind(ago(Duration::days(*days)))
        .execute(&mut *tx)
        .await
        .map_err(seed_error)?;
    }

    for (product_id, customer_id, rating, comment, days) in REVIEWS {
        sqlx::query(
            "INSERT INTO reviews (product_id, customer_id, rating, comment, created_at) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(*product_id)
        .bind(*customer_id)
        .bind(*rating)
        .bind(*comment)
        .bind(ago(Duration::days(*days)))
        .execute(&mut *tx)
        .await
        .map_err(seed_error)?;
    }

    tx.commit().await.map_err(seed_error)?;
    Ok(())
}

/// Removes a database file along with any WAL side files.
fn remove_database_files(path: &Path) -> Result<()> {
    std::fs::remove_file(path).map_err(|e| {
        SqlGateError::internal(format!("Failed to remove {}: {e}", path.display()))
    })?;

    for suffix in ["-wal", "-shm"] {
        let mut side = path.as_os_str().to_owned();
        side.push(suffix);
        let side = Path::new(&side);
        if side.exists() {
            std::fs::remove_file(side).map_err(|e| {
                SqlGateError::internal(format!("Failed to remove {}: {e}", side.display()))
            })?;
        }
    }

    Ok(())
}

/// Current local time truncated to whole seconds.
fn now_seconds() -> NaiveDateTime {
    let now = Local::now().naive_local();
    now.with_nanosecond(0).unwrap_or(now)
}

fn seed_error(error: sqlx::Error) -> SqlGateError {
    SqlGateError::internal(format!("Failed to seed database: {error}"))
}
