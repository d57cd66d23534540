use std::fs::File;
use std::io::{self, BufReader, BufWriter};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{bail, Context, Result};
use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use serde::Serialize;
use serde_json::Value as Json;
use tabula_core::{FieldDescriptor, PageSize, TableConfig, ViewState};
use tabula_search::{CommandSearch, CommandSearchConfig};
use tabula_table::DataTable;
use tracing::{debug, info, warn};

mod catalog;

#[derive(Parser, Debug)]
#[command(name = "tabulactl", version, about = "Query, sort and export JSON tables")]
struct Cli {
    /// Output format
    #[arg(short = 'o', long = "output", value_enum, global = true, default_value_t = Output::Human)]
    output: Output,

    /// Print Prometheus metrics to stderr on exit
    #[arg(long = "metrics", global = true, action = ArgAction::SetTrue)]
    metrics: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum Output { Human, Json }

#[derive(Args, Debug)]
struct ViewArgs {
    /// JSON file holding an array of objects
    file: PathBuf,
    /// Field as KEY[:LABEL][:nosort]; KEY may be a JSON pointer like /meta/owner
    #[arg(short = 'f', long = "field")]
    fields: Vec<String>,
    /// Search query
    #[arg(short = 'q', long = "query")]
    query: Option<String>,
    /// Header click on FIELD; repeat the same field to sort descending
    #[arg(long = "sort")]
    sort: Vec<String>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print one page of the filtered and sorted view
    Query {
        #[command(flatten)]
        view: ViewArgs,
        /// 1-based page number
        #[arg(long = "page", default_value_t = 1)]
        page: usize,
        /// Rows per page (10, 20 or 50)
        #[arg(long = "page-size", value_parser = PageSize::from_str)]
        page_size: Option<PageSize>,
    },
    /// Write the whole filtered and sorted view as CSV
    Export {
        #[command(flatten)]
        view: ViewArgs,
        /// Output path (default: stdout)
        #[arg(long = "out")]
        out: Option<PathBuf>,
    },
    /// Search the route catalog
    Routes {
        /// Query; blank lists the first routes
        query: Option<String>,
        /// Role of the current user
        #[arg(long = "role")]
        roles: Vec<String>,
    },
}

fn init_tracing() {
    let env = std::env::var("TABULA_LOG").unwrap_or_else(|_| "info".to_string());
    let filter = tracing_subscriber::EnvFilter::from_str(&env).unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).with_target(true).with_writer(io::stderr).init();
}

fn init_metrics(enabled: bool) -> Option<metrics_exporter_prometheus::PrometheusHandle> {
    if !enabled {
        return None;
    }
    match metrics_exporter_prometheus::PrometheusBuilder::new().install_recorder() {
        Ok(handle) => Some(handle),
        Err(e) => {
            warn!(error = %e, "failed to install metrics recorder");
            None
        }
    }
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let metrics = init_metrics(cli.metrics);
    metrics::counter!("tabulactl_invocations_total", 1);
    let config = TableConfig::from_env();

    match cli.command {
        Commands::Query { view, page, page_size } => {
            let mut table = open_table(&view, config)?;
            if let Some(size) = page_size {
                table.set_page_size(size);
            }
            table.set_page(page);
            let fields = table.fields().clone();
            let view_state = table.view().clone();
            let page = table.page()?;
            let labels: Vec<String> = fields.iter().map(|f| f.label.clone()).collect();
            let cells: Vec<Vec<String>> =
                page.rows.iter().map(|r| fields.iter().map(|f| f.search_text(r)).collect()).collect();
            info!(rows = page.rows.len(), total = page.total_rows, page = page.page, "query done");
            match cli.output {
                Output::Human => {
                    print_grid(&labels, &cells);
                    println!("page {}/{} • {} rows", page.page, page.total_pages.max(1), page.total_rows);
                }
                Output::Json => {
                    #[derive(Serialize)]
                    struct QueryOut<'a> {
                        view: &'a ViewState,
                        total_rows: usize,
                        total_pages: usize,
                        rows: &'a [&'a Json],
                    }
                    let out = QueryOut {
                        view: &view_state,
                        total_rows: page.total_rows,
                        total_pages: page.total_pages,
                        rows: &page.rows,
                    };
                    println!("{}", serde_json::to_string_pretty(&out)?);
                }
            }
        }
        Commands::Export { view, out } => {
            let mut table = open_table(&view, config)?;
            match out {
                Some(path) => {
                    let file = File::create(&path).with_context(|| format!("create {}", path.display()))?;
                    table.export_csv(BufWriter::new(file))?;
                    info!(path = %path.display(), "exported");
                }
                None => table.export_csv(io::stdout().lock())?,
            }
        }
        Commands::Routes { query, roles } => {
            let search = CommandSearch::new(&catalog::routes(), &roles, CommandSearchConfig::default())?;
            let q = query.unwrap_or_default();
            let hits = search.search(&q);
            debug!(query = %q, hits = hits.len(), "routes searched");
            match cli.output {
                Output::Human => {
                    for h in &hits {
                        println!("{:<32} {:<20} {:.3}", highlight(&h.command.title, &h.title_hits), h.command.path, h.score);
                    }
                }
                Output::Json => {
                    #[derive(Serialize)]
                    struct RouteOut<'a> {
                        key: &'a str,
                        path: &'a str,
                        title: &'a str,
                        score: f64,
                        title_hits: &'a [usize],
                    }
                    let rows: Vec<RouteOut> = hits
                        .iter()
                        .map(|h| RouteOut {
                            key: &h.command.key,
                            path: &h.command.path,
                            title: &h.command.title,
                            score: h.score,
                            title_hits: &h.title_hits,
                        })
                        .collect();
                    println!("{}", serde_json::to_string_pretty(&rows)?);
                }
            }
        }
    }

    if let Some(handle) = metrics {
        eprintln!("{}", handle.render());
    }
    Ok(())
}

fn open_table(args: &ViewArgs, config: TableConfig) -> Result<DataTable<Json>> {
    let records = load_records(&args.file)?;
    let fields = if args.fields.is_empty() {
        infer_fields(&records)
    } else {
        args.fields.iter().map(|s| parse_field(s)).collect::<Result<Vec<_>>>()?
    };
    debug!(records = records.len(), fields = fields.len(), "table loaded");
    let mut table = DataTable::new(records, fields, config)?;
    if let Some(q) = &args.query {
        table.set_query(q.clone());
    }
    for field in &args.sort {
        table.click_sort(field).with_context(|| format!("sort by {field}"))?;
    }
    Ok(table)
}

fn load_records(path: &Path) -> Result<Vec<Json>> {
    let file = File::open(path).with_context(|| format!("open {}", path.display()))?;
    let doc: Json = serde_json::from_reader(BufReader::new(file)).with_context(|| format!("parse {}", path.display()))?;
    match doc {
        Json::Array(items) => Ok(items),
        _ => bail!("{}: expected a JSON array of objects", path.display()),
    }
}

/// Top-level keys of the first record, in the order serde_json yields them.
fn infer_fields(records: &[Json]) -> Vec<FieldDescriptor<Json>> {
    match records.first() {
        Some(Json::Object(map)) => map.keys().map(|k| FieldDescriptor::json(k.clone(), k.clone())).collect(),
        _ => Vec::new(),
    }
}

fn parse_field(raw: &str) -> Result<FieldDescriptor<Json>> {
    let mut parts = raw.split(':');
    let key = parts.next().unwrap_or_default();
    if key.is_empty() {
        bail!("empty field key in {raw:?}");
    }
    let label = parts.next().filter(|l| !l.is_empty()).unwrap_or(key);
    let sortable = match parts.next() {
        None => true,
        Some("nosort") => false,
        Some(other) => bail!("unknown field flag {other:?} in {raw:?}"),
    };
    Ok(FieldDescriptor::json(key, label).sortable(sortable))
}

fn print_grid(labels: &[String], cells: &[Vec<String>]) {
    let mut widths: Vec<usize> = labels.iter().map(|l| l.chars().count()).collect();
    for row in cells {
        for (w, c) in widths.iter_mut().zip(row) {
            *w = (*w).max(c.chars().count());
        }
    }
    let line = |row: &[String]| {
        row.iter()
            .zip(&widths)
            .map(|(c, w)| format!("{c:<w$}", w = *w))
            .collect::<Vec<_>>()
            .join("  ")
    };
    println!("{}", line(labels).trim_end());
    for row in cells {
        println!("{}", line(row).trim_end());
    }
}

/// Wrap the given character positions in brackets.
fn highlight(text: &str, hits: &[usize]) -> String {
    let mut out = String::with_capacity(text.len() + hits.len() * 2);
    let mut open = false;
    for (i, ch) in text.chars().enumerate() {
        let hit = hits.contains(&i);
        if hit && !open {
            out.push('[');
        } else if !hit && open {
            out.push(']');
        }
        open = hit;
        out.push(ch);
    }
    if open {
        out.push(']');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn field_argument_forms() {
        let f = parse_field("qty").unwrap();
        assert_eq!((f.key.as_str(), f.label.as_str(), f.sortable), ("qty", "qty", true));
        let f = parse_field("/meta/owner:Owner:nosort").unwrap();
        assert_eq!((f.key.as_str(), f.label.as_str(), f.sortable), ("/meta/owner", "Owner", false));
        let f = parse_field("note::nosort").unwrap();
        assert_eq!(f.label, "note");
        assert!(parse_field(":Label").is_err());
        assert!(parse_field("qty:Qty:desc").is_err());
    }

    #[test]
    fn fields_inferred_from_first_record() {
        let records = vec![json!({"name": "Apple", "qty": 5}), json!({"other": 1})];
        let keys: Vec<String> = infer_fields(&records).iter().map(|f| f.key.to_string()).collect();
        assert_eq!(keys, vec!["name", "qty"]);
        assert!(infer_fields(&[]).is_empty());
    }

    #[test]
    fn highlight_groups_runs() {
        assert_eq!(highlight("Vision Inspection", &[0, 1, 2, 3, 4, 5]), "[Vision] Inspection");
        assert_eq!(highlight("Home", &[0, 2]), "[H]o[m]e");
        assert_eq!(highlight("Home", &[]), "Home");
    }

    #[test]
    fn routes_catalog_is_searchable() {
        let search = CommandSearch::new(&catalog::routes(), &[], CommandSearchConfig::default()).unwrap();
        assert_eq!(search.visible().len(), 6);
        assert_eq!(search.search("").len(), 5);
        assert_eq!(search.search("settings")[0].command.key, "settings");
    }
}
