use sqlx::PgPool;
use tracing::info;

/// Idempotent schema statements, applied in order. Unique constraints are
/// named explicitly because `PgStore` maps violations back by name.
pub const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS tenants (
        id                UUID PRIMARY KEY,
        name              TEXT NOT NULL,
        slug              TEXT NOT NULL,
        status            TEXT NOT NULL CHECK (status IN ('trial', 'active', 'suspended')),
        owner_user_id     UUID NOT NULL,
        owner_email       TEXT NOT NULL,
        invite_token_hash TEXT,
        invite_accepted   BOOLEAN NOT NULL DEFAULT FALSE,
        invite_expires_at TIMESTAMPTZ,
        contact           JSONB NOT NULL DEFAULT '{}'::jsonb,
        business          JSONB NOT NULL DEFAULT '{}'::jsonb,
        max_users         BIGINT CHECK (max_users IS NULL OR max_users >= 0),
        max_products      BIGINT CHECK (max_products IS NULL OR max_products >= 0),
        created_at        TIMESTAMPTZ NOT NULL DEFAULT now(),
        updated_at        TIMESTAMPTZ NOT NULL DEFAULT now(),
        CONSTRAINT tenants_slug_key UNIQUE (slug),
        CONSTRAINT tenants_invite_token_hash_key UNIQUE (invite_token_hash)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS users (
        id            UUID PRIMARY KEY,
        tenant_id     UUID NOT NULL REFERENCES tenants (id) ON DELETE CASCADE,
        name          TEXT NOT NULL,
        email         TEXT NOT NULL,
        password_hash TEXT,
        role          TEXT NOT NULL CHECK (role IN ('owner', 'manager', 'staff')),
        status        TEXT NOT NULL CHECK (status IN ('invited', 'active', 'suspended')),
        created_at    TIMESTAMPTZ NOT NULL DEFAULT now(),
        updated_at    TIMESTAMPTZ NOT NULL DEFAULT now(),
        CONSTRAINT users_tenant_email_key UNIQUE (tenant_id, email),
        CONSTRAINT users_tenant_id_key UNIQUE (tenant_id, id)
    )
    "#,
    // The owner must be a user of the same tenant. Deferred so tenant and
    // owner can be inserted in one transaction.
    r#"
    DO $$
    BEGIN
        IF NOT EXISTS (SELECT 1 FROM pg_constraint WHERE conname = 'tenants_owner_fkey') THEN
            ALTER TABLE tenants
                ADD CONSTRAINT tenants_owner_fkey FOREIGN KEY (id, owner_user_id)
                REFERENCES users (tenant_id, id) DEFERRABLE INITIALLY DEFERRED;
        END IF;
    END
    $$
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS super_admins (
        id            UUID PRIMARY KEY,
        name          TEXT NOT NULL,
        email         TEXT NOT NULL,
        password_hash TEXT NOT NULL,
        created_at    TIMESTAMPTZ NOT NULL DEFAULT now(),
        CONSTRAINT super_admins_email_key UNIQUE (email)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS categories (
        id          UUID PRIMARY KEY,
        tenant_id   UUID NOT NULL REFERENCES tenants (id) ON DELETE CASCADE,
        name        TEXT NOT NULL,
        description TEXT,
        created_at  TIMESTAMPTZ NOT NULL DEFAULT now(),
        updated_at  TIMESTAMPTZ NOT NULL DEFAULT now(),
        CONSTRAINT categories_tenant_name_key UNIQUE (tenant_id, name),
        CONSTRAINT categories_tenant_id_key UNIQUE (tenant_id, id)
    )
    "#,
    // Composite foreign key: a product can only point at a category of its own tenant.
    r#"
    CREATE TABLE IF NOT EXISTS products (
        id            UUID PRIMARY KEY,
        tenant_id     UUID NOT NULL REFERENCES tenants (id) ON DELETE CASCADE,
        name          TEXT NOT NULL,
        category_id   UUID NOT NULL,
        sku           TEXT NOT NULL,
        cost_price    NUMERIC(14, 2) NOT NULL CHECK (cost_price >= 0),
        selling_price NUMERIC(14, 2) NOT NULL CHECK (selling_price >= 0),
        quantity      BIGINT NOT NULL CHECK (quantity >= 0),
        unit          TEXT NOT NULL,
        reorder_level BIGINT NOT NULL CHECK (reorder_level >= 0),
        supplier_name TEXT NOT NULL,
        status        TEXT NOT NULL CHECK (status IN ('active', 'inactive', 'discontinued')),
        image         TEXT,
        created_at    TIMESTAMPTZ NOT NULL DEFAULT now(),
        updated_at    TIMESTAMPTZ NOT NULL DEFAULT now(),
        CONSTRAINT products_tenant_sku_key UNIQUE (tenant_id, sku),
        CONSTRAINT products_category_fkey FOREIGN KEY (tenant_id, category_id)
            REFERENCES categories (tenant_id, id)
    )
    "#,
    "CREATE INDEX IF NOT EXISTS products_tenant_category_idx ON products (tenant_id, category_id)",
    "CREATE INDEX IF NOT EXISTS products_tenant_low_stock_idx ON products (tenant_id) WHERE quantity <= reorder_level",
];

pub async fn run(pool: &PgPool) -> Result<(), sqlx::Error> {
    for statement in SCHEMA {
        sqlx::query(statement).execute(pool).await?;
    }
    info!("Applied {} schema statements", SCHEMA.len());
    Ok(())
}
