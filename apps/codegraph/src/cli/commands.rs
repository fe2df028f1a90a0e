//! # CLI Command Implementations
//!
//! This module contains the actual implementations of CLI commands.

use crate::config::Config;
use crate::git::GitSource;
use crate::output::{QuadOutput, open_input};
use crate::parser::ParserClient;
use codegraph_core::{
    AstEncoder, AstExporter, AstIdPolicy, AstNode, CodegraphError, ImportStats, Importer,
    NQuadsReader, NQuadsWriter, Quad, QuadSink, QuadStore, QuadWriter, RedbStore, SortBy,
    StatsAggregator, StatsQuery, Value,
};
use std::io::Read;
use std::path::{Path, PathBuf};

/// Quads per store transaction when loading a file.
const LOAD_BATCH_SIZE: usize = 10_000;

// =============================================================================
// IMPORTER SETUP
// =============================================================================

/// Connect to the parser service when AST export is enabled.
///
/// An explicitly configured address that does not answer is an error. The
/// default address is best-effort: AST export is turned off with a warning.
pub fn connect_parser(config: &Config) -> Result<Option<ParserClient>, CodegraphError> {
    if !config.export.uast {
        return Ok(None);
    }
    let (address, explicit) = config.parser_address();
    match ParserClient::connect(address, config.parser.connect_timeout_secs) {
        Ok(client) => Ok(Some(client)),
        Err(e) if !explicit => {
            tracing::warn!(address, error = %e, "Parser not reachable, AST export disabled");
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

/// Build an importer with language tagging and, if available, AST export.
pub fn build_importer(config: &Config) -> Result<Importer, CodegraphError> {
    let mut exporter = AstExporter::default().with_policy(config.export.ast_ids);
    if let Some(client) = connect_parser(config)? {
        exporter = exporter.with_parser(Box::new(client));
    }
    Ok(Importer::new().with_hook(Box::new(exporter)))
}

/// Import every repository through one sink. Stops at the first failure.
fn import_all(
    importer: &mut Importer,
    repos: &[PathBuf],
    sink: &mut QuadSink<'_>,
) -> Result<ImportStats, CodegraphError> {
    let mut total = ImportStats::default();
    for path in repos {
        let source = GitSource::open(path)?;
        let stats = importer.import(&source, sink)?;
        total.commits += stats.commits;
        total.files += stats.files;
        total.quads += stats.quads;
    }
    Ok(total)
}

fn print_import_summary(total: &ImportStats, repos: usize, json_mode: bool) {
    if json_mode {
        let output = serde_json::json!({
            "repositories": repos,
            "commits": total.commits,
            "files": total.files,
            "quads": total.quads,
        });
        println!(
            "{}",
            serde_json::to_string_pretty(&output).unwrap_or_default()
        );
    } else {
        println!("Repositories: {}", repos);
        println!("Commits:      {}", total.commits);
        println!("Files:        {}", total.files);
        println!("Quads:        {}", total.quads);
    }
}

// =============================================================================
// QUADS COMMAND
// =============================================================================

/// Write repositories as N-Quads to stdout or a file.
pub fn cmd_quads(
    config: &Config,
    repos: &[PathBuf],
    output: Option<&Path>,
    json_mode: bool,
) -> Result<(), CodegraphError> {
    let mut importer = build_importer(config)?;
    let mut writer = NQuadsWriter::new(QuadOutput::open(output)?);

    let total = {
        let mut sink = QuadSink::new(&mut writer);
        import_all(&mut importer, repos, &mut sink)?
    };
    writer.into_inner()?.finish()?;

    // Stdout carries the quads themselves.
    if output.is_some() {
        print_import_summary(&total, repos.len(), json_mode);
    } else {
        tracing::info!(commits = total.commits, quads = total.quads, "Wrote quads");
    }
    Ok(())
}

// =============================================================================
// IMPORT COMMAND
// =============================================================================

/// Import repositories into the redb database.
pub fn cmd_import(
    db_path: &Path,
    config: &Config,
    repos: &[PathBuf],
    json_mode: bool,
) -> Result<(), CodegraphError> {
    let mut importer = build_importer(config)?;
    let mut store = RedbStore::open(db_path)?;

    let total = {
        let mut sink = QuadSink::new(&mut store);
        import_all(&mut importer, repos, &mut sink)?
    };

    tracing::info!(database = %db_path.display(), quads = total.quads, "Import complete");
    print_import_summary(&total, repos.len(), json_mode);
    Ok(())
}

// =============================================================================
// EXPORT COMMAND
// =============================================================================

/// Dump the database as N-Quads.
pub fn cmd_export(
    db_path: &Path,
    output: Option<&Path>,
    json_mode: bool,
) -> Result<(), CodegraphError> {
    let store = RedbStore::open(db_path)?;
    let mut writer = NQuadsWriter::new(QuadOutput::open(output)?);

    store.for_each_quad(&mut |quad| writer.write_quad(quad))?;
    let count = writer.count();
    writer.into_inner()?.finish()?;

    match output {
        Some(path) if json_mode => {
            let out = serde_json::json!({
                "success": true,
                "path": path.to_string_lossy(),
                "quads": count,
            });
            println!("{}", serde_json::to_string_pretty(&out).unwrap_or_default());
        }
        Some(path) => println!("Exported {} quads to {}", count, path.display()),
        None => tracing::info!(quads = count, "Exported quads"),
    }
    Ok(())
}

// =============================================================================
// LOAD COMMAND
// =============================================================================

/// Load an N-Quads file into the database. Duplicates are ignored.
pub fn cmd_load(db_path: &Path, file: &Path, json_mode: bool) -> Result<(), CodegraphError> {
    tracing::info!("Loading quads from {:?}", file);

    let reader = NQuadsReader::new(open_input(file)?);
    let mut store = RedbStore::open(db_path)?;

    let mut batch: Vec<Quad> = Vec::with_capacity(LOAD_BATCH_SIZE);
    let mut read = 0usize;
    let mut inserted = 0usize;
    for quad in reader {
        batch.push(quad?);
        read += 1;
        if batch.len() == LOAD_BATCH_SIZE {
            inserted += store.insert_batch(&batch)?;
            batch.clear();
        }
    }
    if !batch.is_empty() {
        inserted += store.insert_batch(&batch)?;
    }

    if json_mode {
        let output = serde_json::json!({
            "success": true,
            "read": read,
            "inserted": inserted,
        });
        println!(
            "{}",
            serde_json::to_string_pretty(&output).unwrap_or_default()
        );
    } else {
        println!("Read {} quads, {} new", read, inserted);
    }
    Ok(())
}

// =============================================================================
// STATS COMMAND
// =============================================================================

/// Rank the commits of every repository in the database.
pub fn cmd_stats(
    db_path: &Path,
    limit: usize,
    sort: SortBy,
    exclude_merges: bool,
    json_mode: bool,
) -> Result<(), CodegraphError> {
    let store = RedbStore::open(db_path)?;
    let agg = StatsAggregator::new(&store);
    let query = StatsQuery {
        sort,
        limit,
        exclude_merges,
    };

    let mut report = Vec::new();
    for repo in agg.repositories()? {
        let ranked = agg.repository_stats(&repo, &query)?;
        report.push((repo, ranked));
    }

    if json_mode {
        let repos: Vec<_> = report
            .iter()
            .map(|(repo, ranked)| {
                serde_json::json!({
                    "repository": repo.as_iri().unwrap_or_default(),
                    "commits": ranked,
                })
            })
            .collect();
        println!(
            "{}",
            serde_json::to_string_pretty(&repos).unwrap_or_default()
        );
        return Ok(());
    }

    for (repo, ranked) in &report {
        println!("{}", repo.as_iri().unwrap_or_default());
        println!("{}", "=".repeat(60));
        println!(
            "{:>7} {:>5} {:>5} {:>5} {:>5}  commit",
            "touched", "add", "rm", "mod", "files"
        );
        for s in ranked {
            let subject = s.message.lines().next().unwrap_or_default();
            println!(
                "{:>7} {:>5} {:>5} {:>5} {:>5}  {} {}",
                s.touched(),
                s.added,
                s.removed,
                s.modified,
                s.files,
                s.commit,
                subject
            );
        }
        println!();
    }
    Ok(())
}

// =============================================================================
// UAST COMMAND
// =============================================================================

/// Convert JSON syntax tree files to N-Quads on stdout or a file.
///
/// The file node is `<basename>`, or `<stdin>` for `-`.
pub fn cmd_uast(
    files: &[PathBuf],
    output: Option<&Path>,
    policy: AstIdPolicy,
) -> Result<(), CodegraphError> {
    let mut encoder = AstEncoder::new(policy);
    let mut writer = NQuadsWriter::new(QuadOutput::open(output)?);

    {
        let mut sink = QuadSink::new(&mut writer);
        for path in files {
            let (file, text) = read_tree_source(path)?;
            let root = AstNode::from_json_str(&text)?;
            encoder.as_quads(&mut sink, &file, &root)?;
        }
    }
    let count = writer.count();
    writer.into_inner()?.finish()?;
    tracing::info!(files = files.len(), quads = count, "Encoded syntax trees");
    Ok(())
}

fn read_tree_source(path: &Path) -> Result<(Value, String), CodegraphError> {
    if path.as_os_str() == "-" {
        let mut text = String::new();
        std::io::stdin().read_to_string(&mut text)?;
        return Ok((Value::iri("stdin"), text));
    }

    let text = std::fs::read_to_string(path)
        .map_err(|e| CodegraphError::Io(format!("Cannot read '{}': {}", path.display(), e)))?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| CodegraphError::Io(format!("'{}' has no file name", path.display())))?;
    Ok((Value::iri(name), text))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ast_export_off_means_no_parser() {
        let config = Config::default();
        assert!(connect_parser(&config).expect("no parser").is_none());
    }

    #[test]
    fn unreachable_default_parser_degrades() {
        let mut config = Config::default();
        config.export.uast = true;
        config.parser.connect_timeout_secs = 1;
        assert!(connect_parser(&config).is_ok());
    }

    #[test]
    fn unreachable_explicit_parser_is_fatal() {
        let mut config = Config::default();
        config.apply_cli(Some("127.0.0.1:9".to_string()), false, None);
        config.parser.connect_timeout_secs = 1;
        assert!(matches!(
            connect_parser(&config),
            Err(CodegraphError::ParserUnavailable(_))
        ));
    }

    #[test]
    fn tree_file_named_by_basename() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("main.json");
        std::fs::write(&path, r#"{"type":"File"}"#).expect("write");

        let (file, text) = read_tree_source(&path).expect("read");
        assert_eq!(file, Value::iri("main.json"));
        assert_eq!(text, r#"{"type":"File"}"#);
    }
}
