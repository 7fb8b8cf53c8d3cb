use std::fs;
use std::path::PathBuf;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use comfy_table::{presets::UTF8_FULL, Cell, Table};
use rust_decimal::Decimal;
use sqlx::postgres::PgRow;
use sqlx::{Column, PgPool, Row, TypeInfo};

use crate::config::Settings;
use crate::core::{ListingId, RunMode, RunnerError};
use crate::output;
use crate::resolve::ResolvedParams;

/// How many rows `top` mode prints.
pub const PRINT_NUM_ROWS: usize = 10;

/// Substitute bind parameters into SQL text by plain substring replacement:
/// every literal occurrence of each non-reserved key is replaced with the
/// stringified value. No tokenization and no delimiters; the listing
/// templates and parameter names are curated together so that overlapping
/// names do not collide. A different strategy would change the resulting SQL
/// byte-for-byte, so this one is kept exactly.
pub fn substitute_params(sql: &str, params: &ResolvedParams) -> String {
    let mut sql = sql.to_string();
    for (key, value) in params.bind_params() {
        // save_ext steers the CSV file name, it is not a bind variable
        if key == "save_ext" {
            continue;
        }
        sql = sql.replace(key.as_str(), &ResolvedParams::value_to_string(value));
    }
    sql
}

/// CSV artifact path for `save` mode:
/// `{out_dir}/{schema}/{schema}_{name minus the listing_C_L_ prefix}[_{save_ext}].csv`.
pub fn csv_target_path(
    settings: &Settings,
    schema: &str,
    id: &ListingId,
    name: &str,
    save_ext: Option<&str>,
) -> PathBuf {
    let listing_prefix = format!("listing_{}_{}_", id.chapter, id.listing);
    let mut file_name = format!("{}_{}", schema, name.replace(&listing_prefix, ""));
    if let Some(ext) = save_ext {
        file_name.push('_');
        file_name.push_str(ext);
    }
    file_name.push_str(".csv");
    settings.out_dir.join(schema).join(file_name)
}

/// Run one SQL listing: load the template, scope it to the schema,
/// substitute parameters, execute, and handle the result per the mode.
pub async fn run_sql_listing(
    pool: &PgPool,
    settings: &Settings,
    id: &ListingId,
    params: &ResolvedParams,
) -> Result<(), RunnerError> {
    let schema = params.get_str("schema").unwrap_or_default().to_string();
    let full_name = id.full_name(params.name());
    let path = settings
        .listing_dir
        .join(format!("chap{}", id.chapter))
        .join(format!("{full_name}.sql"));
    if !path.is_file() {
        return Err(RunnerError::TemplateMissing(path));
    }
    let template = fs::read_to_string(&path)?;

    // the templates do not name the schema; scope the search path up front
    let mut sql = format!("set search_path = '{schema}'; ");
    sql.push_str(&template);
    let sql = substitute_params(&sql, params);

    output::print_block(&format!("SQL:\n----------\n{sql}\n----------\nRESULT:")).await;
    let sql = sql.replace('\n', " ");

    match params.mode()? {
        RunMode::Run => {
            sqlx::raw_sql(&sql).execute(pool).await?;
        }
        RunMode::One => {
            let rows = sqlx::raw_sql(&sql).fetch_all(pool).await?;
            if rows.len() != 1 {
                return Err(RunnerError::NotOneRow(rows.len()));
            }
            let cells = row_to_strings(&rows[0])?;
            output::print_block(&format!("({})", cells.join(", "))).await;
        }
        RunMode::Top => {
            let rows = sqlx::raw_sql(&sql).fetch_all(pool).await?;
            output::print_block(&render_table(&rows)?).await;
        }
        RunMode::Save => {
            let rows = sqlx::raw_sql(&sql).fetch_all(pool).await?;
            let header: Vec<String> = rows
                .first()
                .map(|r| r.columns().iter().map(|c| c.name().to_string()).collect())
                .unwrap_or_default();
            let records = rows
                .iter()
                .map(row_to_strings)
                .collect::<Result<Vec<_>, _>>()?;
            let csv_path = csv_target_path(settings, &schema, id, params.name(), params.save_ext());
            save_csv(&csv_path, &header, &records)?;
            println!("Saving: {}", csv_path.display());
        }
    }
    Ok(())
}

/// Render the first `PRINT_NUM_ROWS` rows as a table, with a total count.
fn render_table(rows: &[PgRow]) -> Result<String, RunnerError> {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    if let Some(first) = rows.first() {
        table.set_header(first.columns().iter().map(|c| Cell::new(c.name())));
    }
    for row in rows.iter().take(PRINT_NUM_ROWS) {
        table.add_row(row_to_strings(row)?.iter().map(Cell::new));
    }
    Ok(format!("{}\n({} rows)", table, rows.len()))
}

/// Write the full result to `csv_path`, header first, overwriting any
/// previous artifact at that path. Parent directories are created.
fn save_csv(
    csv_path: &std::path::Path,
    header: &[String],
    records: &[Vec<String>],
) -> Result<(), RunnerError> {
    if let Some(parent) = csv_path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut writer = csv::Writer::from_path(csv_path)?;
    if !header.is_empty() {
        writer.write_record(header)?;
    }
    for record in records {
        writer.write_record(record)?;
    }
    writer.flush()?;
    Ok(())
}

fn row_to_strings(row: &PgRow) -> Result<Vec<String>, RunnerError> {
    (0..row.len()).map(|i| cell_to_string(row, i)).collect()
}

/// Decode one cell to its text form by declared column type. SQL NULL
/// renders as the empty string.
fn cell_to_string(row: &PgRow, idx: usize) -> Result<String, RunnerError> {
    fn fmt<T: ToString>(v: Option<T>) -> String {
        v.map(|v| v.to_string()).unwrap_or_default()
    }

    let type_name = row.column(idx).type_info().name().to_string();
    let text = match type_name.as_str() {
        "BOOL" => fmt(row.try_get::<Option<bool>, _>(idx)?),
        "INT2" => fmt(row.try_get::<Option<i16>, _>(idx)?),
        "INT4" => fmt(row.try_get::<Option<i32>, _>(idx)?),
        "INT8" => fmt(row.try_get::<Option<i64>, _>(idx)?),
        "FLOAT4" => fmt(row.try_get::<Option<f32>, _>(idx)?),
        "FLOAT8" => fmt(row.try_get::<Option<f64>, _>(idx)?),
        "NUMERIC" => fmt(row.try_get::<Option<Decimal>, _>(idx)?),
        "DATE" => fmt(row.try_get::<Option<NaiveDate>, _>(idx)?),
        "TIMESTAMP" => fmt(row.try_get::<Option<NaiveDateTime>, _>(idx)?),
        "TIMESTAMPTZ" => fmt(row.try_get::<Option<DateTime<Utc>>, _>(idx)?),
        _ => fmt(row.try_get::<Option<String>, _>(idx)?),
    };
    Ok(text)
}
