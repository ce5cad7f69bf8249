//! Initialization helpers for the application:
//! - database connection + migrations
//! - idempotent seeding of reference data (schedule types, ministries,
//!   roles, member roster, default settings, admin user)

use std::path::Path;

use anyhow::Result;

use crate::config::Config;
use crate::db::{
    MemberRepository, MinistryRepository, RoleRepository, ScheduleTypeRepository,
    SettingRepository, UserRepository,
};

/// Initialize the SQLite database connection and run migrations.
///
/// Creates the parent directory for the database file (if applicable),
/// opens a connection pool using `create_if_missing(true)` and runs
/// migrations.
pub async fn init_db(config: &Config) -> Result<sqlx::SqlitePool> {
    let db_url = &config.database.url;
    tracing::info!("Connecting to database: {}", db_url);

    let db_path = db_url.strip_prefix("sqlite://").unwrap_or(db_url);

    if db_path != ":memory:" {
        let db_file_path = Path::new(db_path);
        if let Some(parent) = db_file_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    anyhow::anyhow!(
                        "Failed to create database directory {}: {}",
                        parent.display(),
                        e
                    )
                })?;
            }
        }
    }

    let connect_options = sqlx::sqlite::SqliteConnectOptions::new()
        .filename(db_path)
        .create_if_missing(true);

    let pool = sqlx::sqlite::SqlitePoolOptions::new()
        .max_connections(config.database.max_connections)
        .connect_with(connect_options)
        .await?;

    tracing::info!("Running database migrations");
    sqlx::migrate!("./migrations").run(&pool).await?;

    Ok(pool)
}

const SCHEDULE_TYPES: &[(&str, &str)] = &[
    ("EBD", "Escala de Professores da Escola Bíblica Dominical"),
    ("Louvor", "Escala do Ministério de Louvor"),
    ("Cultos", "Escala de Cultos e Trabalhos Ministeriais"),
];

const MINISTRIES: &[(&str, &str)] = &[
    ("EBD", "Escola Bíblica Dominical"),
    ("Louvor", "Ministério de Louvor"),
    ("Pastoral", "Ministério Pastoral"),
    ("Mulheres", "Ministério de Mulheres"),
    ("Família", "Ministério da Família"),
    ("Missões", "Ministério de Missões"),
];

// (role name, ministry, description)
const ROLES: &[(&str, &str, &str)] = &[
    ("Professor Adultos", "EBD", "Professor da classe de adultos"),
    ("Professor Jovens", "EBD", "Professor da classe de jovens"),
    (
        "Professor Adolescentes",
        "EBD",
        "Professor da classe de adolescentes",
    ),
    ("Professor Juniores", "EBD", "Professor da classe de juniores"),
    ("Bateria", "Louvor", "Instrumentista - Bateria"),
    ("Teclado", "Louvor", "Instrumentista - Teclado"),
    ("Baixo", "Louvor", "Instrumentista - Baixo"),
    ("Guitarra", "Louvor", "Instrumentista - Guitarra"),
    ("Violão", "Louvor", "Instrumentista - Violão"),
    ("Back", "Louvor", "Vocal de apoio"),
    ("Ministro", "Louvor", "Ministro de louvor"),
    ("Fotografia", "Louvor", "Fotografia do culto"),
    ("Dirigente", "Pastoral", "Dirigente do culto"),
    ("Pregador", "Pastoral", "Pregador do culto"),
];

// (member name, ministry, role) — imported roster. Members appearing in
// more than one ministry keep their first entry.
const MEMBERS: &[(&str, &str, &str)] = &[
    ("Pr Salvador", "EBD", "Professor Adultos"),
    ("Sildete", "EBD", "Professor Jovens"),
    ("Deusilene", "EBD", "Professor Adolescentes"),
    ("Dora", "EBD", "Professor Juniores"),
    ("Clovis", "EBD", "Professor Adultos"),
    ("Marta", "EBD", "Professor Jovens"),
    ("Dc Silvania", "EBD", "Professor Adolescentes"),
    ("Diwene", "EBD", "Professor Juniores"),
    ("Pra Josélia", "EBD", "Professor Adultos"),
    ("Pb Deyviton", "EBD", "Professor Jovens"),
    ("Mary", "EBD", "Professor Adolescentes"),
    ("Pb Paulo", "EBD", "Professor Adultos"),
    ("Pr Edilson", "EBD", "Professor Adultos"),
    ("Pr Carlos", "EBD", "Professor Adultos"),
    ("Luiz Felipe", "Louvor", "Bateria"),
    ("Clovis J.", "Louvor", "Teclado"),
    ("Jonas", "Louvor", "Baixo"),
    ("Davi", "Louvor", "Guitarra"),
    ("Moisés", "Louvor", "Violão"),
    ("Silvânia", "Louvor", "Back"),
    ("Vitória", "Louvor", "Back"),
    ("Ingrid", "Louvor", "Back"),
    ("Thauana", "Louvor", "Back"),
    ("Thiele", "Louvor", "Back"),
    ("Maria Clara", "Louvor", "Back"),
    ("Joyce", "Louvor", "Back"),
    ("Sueli", "Louvor", "Back"),
    ("Danilo", "Louvor", "Bateria"),
    ("PR Ribamar", "Pastoral", "Pregador"),
    ("Dca Sildete", "Pastoral", "Dirigente"),
    ("DCA Sueli", "Mulheres", "Dirigente"),
    ("Convidado", "Pastoral", "Pregador"),
    ("Dca Silvana", "Pastoral", "Dirigente"),
    ("DCA Deusilene", "Pastoral", "Dirigente"),
    ("DCA Katiane", "Pastoral", "Pregador"),
    ("DCA mariuce", "Pastoral", "Dirigente"),
    ("Pb Clóvis", "Pastoral", "Dirigente"),
    ("DCA Doralice", "Pastoral", "Dirigente"),
    ("PB Elias", "Pastoral", "Pregador"),
    ("Dc Doralice/Joel", "Pastoral", "Dirigente"),
    ("Pb Walney", "Pastoral", "Pregador"),
];

const SETTINGS: &[(&str, &str, &str)] = &[
    ("church_name", "Igreja Assembleia de Deus", "Nome da igreja"),
    ("church_address", "Rua Exemplo, 123", "Endereço da igreja"),
    ("church_phone", "(00) 0000-0000", "Telefone da igreja"),
    ("church_email", "contato@igreja.com", "Email da igreja"),
    (
        "schedule_notification_days",
        "7",
        "Dias de antecedência para notificação de escala",
    ),
];

/// Seed reference data. Safe to run on every startup: every insert is
/// keyed on a unique column or preceded by an existence check.
pub async fn seed_db(pool: &sqlx::SqlitePool) -> Result<()> {
    tracing::info!("Seeding reference data");

    for (name, description) in SCHEDULE_TYPES {
        ScheduleTypeRepository::upsert(pool, name, Some(description)).await?;
    }

    for (name, description) in MINISTRIES {
        MinistryRepository::upsert(pool, name, Some(description)).await?;
    }

    for (name, ministry, description) in ROLES {
        let ministry_id = MinistryRepository::find_by_name(pool, ministry)
            .await?
            .map(|m| m.id);
        RoleRepository::upsert(pool, name, ministry_id, Some(description)).await?;
    }

    for (name, ministry, role) in MEMBERS {
        if MemberRepository::find_by_name(pool, name).await?.is_none() {
            MemberRepository::create(pool, name, None, None, Some(ministry), Some(role), true)
                .await?;
        }
    }

    for (key, value, description) in SETTINGS {
        SettingRepository::upsert_default(pool, key, value, Some(description)).await?;
    }

    // Default administrator account (password: admin123). Only created if
    // no user holds the name yet, so a changed password survives restarts.
    if UserRepository::find_by_username(pool, "admin").await?.is_none() {
        let hash = bcrypt::hash("admin123", bcrypt::DEFAULT_COST)?;
        UserRepository::create(pool, "admin", &hash, Some("admin@igreja.com"), "admin", None)
            .await?;
        tracing::info!("Created default admin user");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::ScheduleType;

    #[tokio::test]
    async fn seed_is_idempotent() {
        let pool = sqlx::SqlitePool::connect("sqlite::memory:").await.unwrap();
        sqlx::migrate!("./migrations").run(&pool).await.unwrap();

        seed_db(&pool).await.unwrap();
        seed_db(&pool).await.unwrap();

        let types = sqlx::query_as::<_, ScheduleType>("SELECT * FROM schedule_types")
            .fetch_all(&pool)
            .await
            .unwrap();
        assert_eq!(types.len(), 3);

        let members = MemberRepository::list_all(&pool).await.unwrap();
        assert_eq!(members.len(), MEMBERS.len());

        let admin = UserRepository::find_by_username(&pool, "admin")
            .await
            .unwrap()
            .unwrap();
        assert!(admin.is_admin());
        assert!(bcrypt::verify("admin123", &admin.password).unwrap());
    }
}
