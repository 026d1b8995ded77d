use sqlx::MySqlPool;
use tracing::info;

pub async fn init_db(database_url: &str) -> Result<MySqlPool, sqlx::Error> {
    MySqlPool::connect(database_url).await
}

const CREATE_USERS: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    id BIGINT UNSIGNED NOT NULL AUTO_INCREMENT PRIMARY KEY,
    nama VARCHAR(255) NOT NULL,
    email VARCHAR(255) NOT NULL,
    password VARCHAR(255) NOT NULL,
    role ENUM('mahasiswa', 'admin') NOT NULL DEFAULT 'mahasiswa',
    created_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP,
    UNIQUE KEY uq_users_email (email)
)
"#;

const CREATE_PRESENSI: &str = r#"
CREATE TABLE IF NOT EXISTS presensi (
    id BIGINT UNSIGNED NOT NULL AUTO_INCREMENT PRIMARY KEY,
    user_id BIGINT UNSIGNED NOT NULL,
    date DATE NOT NULL,
    check_in_time DATETIME(3) NOT NULL,
    check_out_time DATETIME(3) NULL,
    UNIQUE KEY uq_presensi_user_date (user_id, date),
    CONSTRAINT fk_presensi_user FOREIGN KEY (user_id)
        REFERENCES users (id) ON DELETE CASCADE
)
"#;

/// Creates the two tables when missing. Timestamps are stored as UTC.
pub async fn ensure_schema(pool: &MySqlPool) -> Result<(), sqlx::Error> {
    for ddl in [CREATE_USERS, CREATE_PRESENSI] {
        sqlx::query(ddl).execute(pool).await?;
    }
    info!("Database schema ready");
    Ok(())
}
