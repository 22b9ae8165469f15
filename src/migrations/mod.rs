use crate::types::DbPool;

pub async fn run(db_pool: &DbPool) -> Result<(), sqlx::Error> {
    sqlx::raw_sql(
        "
        CREATE TABLE IF NOT EXISTS categories (
            id   INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            slug TEXT NOT NULL UNIQUE
        );

        CREATE TABLE IF NOT EXISTS users (
            id              INTEGER PRIMARY KEY AUTOINCREMENT,
            username        TEXT NOT NULL UNIQUE,
            email           TEXT NOT NULL UNIQUE,
            first_name      TEXT NOT NULL,
            last_name       TEXT NOT NULL,
            password_digest TEXT NOT NULL,
            salt            TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS customers (
            id      INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id INTEGER NOT NULL REFERENCES users (id) ON DELETE CASCADE,
            phone   TEXT,
            address TEXT
        );

        CREATE TABLE IF NOT EXISTS pizza_products (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            category_id INTEGER NOT NULL REFERENCES categories (id) ON DELETE CASCADE,
            title       TEXT NOT NULL,
            slug        TEXT NOT NULL UNIQUE,
            image       TEXT NOT NULL,
            description TEXT NOT NULL,
            price       TEXT NOT NULL,
            size        TEXT NOT NULL,
            board       TEXT NOT NULL,
            dough       TEXT NOT NULL,
            vegetarian  INTEGER NOT NULL DEFAULT 0
        );

        CREATE TABLE IF NOT EXISTS beer_products (
            id               INTEGER PRIMARY KEY AUTOINCREMENT,
            category_id      INTEGER NOT NULL REFERENCES categories (id) ON DELETE CASCADE,
            title            TEXT NOT NULL,
            slug             TEXT NOT NULL UNIQUE,
            image            TEXT NOT NULL,
            description      TEXT NOT NULL,
            price            TEXT NOT NULL,
            colour           TEXT NOT NULL,
            alcohol_strength TEXT NOT NULL,
            filtered         TEXT NOT NULL,
            grade            TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS carts (
            id                 TEXT PRIMARY KEY,
            customer_id        INTEGER REFERENCES customers (id) ON DELETE CASCADE,
            session_id         TEXT,
            total_items        INTEGER NOT NULL DEFAULT 0,
            final_price        TEXT NOT NULL DEFAULT '0',
            in_order           INTEGER NOT NULL DEFAULT 0,
            for_anonymous_user INTEGER NOT NULL DEFAULT 0
        );

        CREATE UNIQUE INDEX IF NOT EXISTS active_cart_per_customer
            ON carts (customer_id) WHERE in_order = 0 AND customer_id IS NOT NULL;
        CREATE UNIQUE INDEX IF NOT EXISTS active_cart_per_session
            ON carts (session_id) WHERE in_order = 0 AND session_id IS NOT NULL;

        CREATE TABLE IF NOT EXISTS cart_items (
            id           TEXT PRIMARY KEY,
            customer_id  INTEGER REFERENCES customers (id) ON DELETE CASCADE,
            session_id   TEXT,
            cart_id      TEXT NOT NULL REFERENCES carts (id) ON DELETE CASCADE,
            product_kind TEXT NOT NULL,
            product_id   INTEGER NOT NULL,
            quantity     INTEGER NOT NULL DEFAULT 1,
            final_price  TEXT NOT NULL DEFAULT '0',

            CONSTRAINT item UNIQUE (cart_id, product_kind, product_id)
        );

        CREATE TABLE IF NOT EXISTS orders (
            id          TEXT PRIMARY KEY,
            customer_id INTEGER NOT NULL REFERENCES customers (id) ON DELETE CASCADE,
            first_name  TEXT NOT NULL,
            last_name   TEXT NOT NULL,
            phone       TEXT NOT NULL,
            address     TEXT,
            status      TEXT NOT NULL DEFAULT 'new',
            buying_type TEXT NOT NULL DEFAULT 'self',
            comment     TEXT,
            created_at  TEXT NOT NULL,
            order_date  TEXT NOT NULL,
            cart_id     TEXT NOT NULL REFERENCES carts (id)
        );

        CREATE TABLE IF NOT EXISTS customer_orders (
            customer_id INTEGER NOT NULL REFERENCES customers (id) ON DELETE CASCADE,
            order_id    TEXT NOT NULL REFERENCES orders (id) ON DELETE CASCADE,

            PRIMARY KEY (customer_id, order_id)
        );
        ",
    )
    .execute(db_pool)
    .await?;

    Ok(())
}
