//! Collection ingestion: scan, chunk, embed, write.
//!
//! `rk ingest` walks the configured docs directory, splits every matching
//! file into paragraph-boundary chunks, optionally embeds each chunk, and
//! writes the whole collection as a JSON array of `{id, text, embedding}`
//! objects — the on-disk form every retrieval command loads at startup.

use anyhow::{bail, Context, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};
use walkdir::WalkDir;

use ragkit_core::chunk::chunk_text;
use ragkit_core::models::Document;

use crate::config::Config;
use crate::embedding::{create_provider, embed_texts};

pub async fn run_ingest(config: &Config, skip_embeddings: bool, dry_run: bool) -> Result<()> {
    let files = scan_docs(config)?;
    if files.is_empty() {
        bail!(
            "No files matched under {} (check ingest.include_globs)",
            config.ingest.docs_dir.display()
        );
    }

    let mut documents: Vec<Document> = Vec::new();
    for (rel_path, text) in &files {
        for chunk in chunk_text(rel_path, text, config.chunking.max_tokens) {
            documents.push(Document {
                id: chunk.id,
                text: chunk.text,
                embedding: None,
            });
        }
    }

    println!(
        "scanned files: {}, chunks: {}",
        files.len(),
        documents.len()
    );

    if dry_run {
        println!("dry run — nothing written");
        return Ok(());
    }

    let embed = !skip_embeddings && config.embedding.is_enabled();
    if embed {
        // Fail fast on bad embedding config before any API traffic.
        let provider = create_provider(&config.embedding)?;
        println!(
            "embedding model: {} ({} dims)",
            provider.model_name(),
            provider.dims()
        );

        let texts: Vec<String> = documents.iter().map(|d| d.text.clone()).collect();
        let batch_size = config.embedding.batch_size.max(1);
        let mut embedded = 0usize;
        for (batch_start, batch) in texts
            .chunks(batch_size)
            .enumerate()
            .map(|(i, b)| (i * batch_size, b))
        {
            let vectors = embed_texts(&config.embedding, batch).await?;
            embedded += apply_batch(&mut documents, batch_start, batch.len(), vectors)?;
        }
        println!("embedded chunks: {embedded}");
    } else if !skip_embeddings {
        println!("embedding provider disabled — writing collection without embeddings");
    }

    let out_path = &config.collection.path;
    if let Some(parent) = out_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
    }
    let json = serde_json::to_string_pretty(&documents)?;
    std::fs::write(out_path, json)
        .with_context(|| format!("Failed to write {}", out_path.display()))?;

    println!("wrote collection: {}", out_path.display());
    Ok(())
}

/// Attach one batch of embedding vectors to the documents starting at
/// `batch_start`. The endpoint must return exactly one vector per input
/// text; anything else is a malformed collaborator response, not a
/// partial success.
fn apply_batch(
    documents: &mut [Document],
    batch_start: usize,
    expected: usize,
    vectors: Vec<Vec<f32>>,
) -> Result<usize> {
    if vectors.len() != expected {
        bail!(
            "Embedding endpoint returned {} vectors for {} texts",
            vectors.len(),
            expected
        );
    }
    for (offset, vector) in vectors.into_iter().enumerate() {
        documents[batch_start + offset].embedding = Some(vector);
    }
    Ok(expected)
}

/// Scan the docs directory, returning `(relative_path, text)` pairs in
/// deterministic (path-sorted) order.
fn scan_docs(config: &Config) -> Result<Vec<(String, String)>> {
    let root = &config.ingest.docs_dir;
    if !root.exists() {
        bail!("Ingest docs_dir does not exist: {}", root.display());
    }

    let include_set = build_globset(&config.ingest.include_globs)?;

    let mut default_excludes = vec![
        "**/.git/**".to_string(),
        "**/target/**".to_string(),
        "**/node_modules/**".to_string(),
    ];
    default_excludes.extend(config.ingest.exclude_globs.clone());
    let exclude_set = build_globset(&default_excludes)?;

    let mut files = Vec::new();
    for entry in WalkDir::new(root) {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        let relative = path.strip_prefix(root).unwrap_or(path);
        let rel_str = relative.to_string_lossy().replace('\\', "/");

        if exclude_set.is_match(&rel_str) || !include_set.is_match(&rel_str) {
            continue;
        }

        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        if text.trim().is_empty() {
            continue;
        }
        files.push((rel_str, text));
    }

    files.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(files)
}

fn build_globset(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        builder.add(Glob::new(pattern).with_context(|| format!("Invalid glob: {pattern}"))?);
    }
    Ok(builder.build()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CollectionConfig, IngestConfig, ProviderConfig};

    fn test_config(docs_dir: std::path::PathBuf, out: std::path::PathBuf) -> Config {
        Config {
            collection: CollectionConfig { path: out },
            ingest: IngestConfig {
                docs_dir,
                ..IngestConfig::default()
            },
            chunking: Default::default(),
            provider: ProviderConfig {
                backend: crate::config::Backend::LocalInference,
                model: "m".to_string(),
                base_url: Some("http://localhost:11434/v1".to_string()),
                api_version: None,
                temperature: None,
                timeout_secs: 30,
            },
            embedding: Default::default(),
            reranker: Default::default(),
            retrieval: Default::default(),
        }
    }

    fn docs(n: usize) -> Vec<Document> {
        (1..=n)
            .map(|i| Document {
                id: format!("a.md-{i}"),
                text: format!("chunk {i}"),
                embedding: None,
            })
            .collect()
    }

    #[test]
    fn test_apply_batch_assigns_in_order() {
        let mut documents = docs(3);
        let n = apply_batch(&mut documents, 1, 2, vec![vec![0.1], vec![0.2]]).unwrap();
        assert_eq!(n, 2);
        assert!(documents[0].embedding.is_none());
        assert_eq!(documents[1].embedding.as_deref(), Some(&[0.1f32][..]));
        assert_eq!(documents[2].embedding.as_deref(), Some(&[0.2f32][..]));
    }

    #[test]
    fn test_apply_batch_rejects_oversized_response() {
        let mut documents = docs(2);
        let err = apply_batch(
            &mut documents,
            0,
            2,
            vec![vec![0.1], vec![0.2], vec![0.3]],
        )
        .unwrap_err();
        assert!(err.to_string().contains("3 vectors for 2 texts"));
        assert!(documents.iter().all(|d| d.embedding.is_none()));
    }

    #[test]
    fn test_apply_batch_rejects_short_response() {
        let mut documents = docs(2);
        let err = apply_batch(&mut documents, 0, 2, vec![vec![0.1]]).unwrap_err();
        assert!(err.to_string().contains("1 vectors for 2 texts"));
        assert!(documents.iter().all(|d| d.embedding.is_none()));
    }

    #[test]
    fn test_scan_respects_globs_and_sorts() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("b.md"), "# Beta\n\nSecond file.").unwrap();
        std::fs::write(tmp.path().join("a.txt"), "First file.").unwrap();
        std::fs::write(tmp.path().join("skip.rs"), "fn main() {}").unwrap();

        let config = test_config(tmp.path().to_path_buf(), tmp.path().join("out.json"));
        let files = scan_docs(&config).unwrap();
        let names: Vec<&str> = files.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["a.txt", "b.md"]);
    }

    #[test]
    fn test_scan_skips_empty_files() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("empty.md"), "   \n").unwrap();
        std::fs::write(tmp.path().join("full.md"), "content").unwrap();

        let config = test_config(tmp.path().to_path_buf(), tmp.path().join("out.json"));
        let files = scan_docs(&config).unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].0, "full.md");
    }

    #[tokio::test]
    async fn test_ingest_writes_loadable_collection() {
        let tmp = tempfile::tempdir().unwrap();
        let docs = tmp.path().join("docs");
        std::fs::create_dir(&docs).unwrap();
        std::fs::write(docs.join("bees.md"), "Digger bees live in burrows.").unwrap();

        let out = tmp.path().join("data/collection.json");
        let config = test_config(docs, out.clone());
        run_ingest(&config, true, false).await.unwrap();

        let bytes = std::fs::read(&out).unwrap();
        let collection = ragkit_core::models::Collection::from_json(&bytes).unwrap();
        assert_eq!(collection.len(), 1);
        assert_eq!(collection.docs()[0].id, "bees.md-1");
        assert!(collection.docs()[0].embedding.is_none());
    }

    #[tokio::test]
    async fn test_ingest_dry_run_writes_nothing() {
        let tmp = tempfile::tempdir().unwrap();
        let docs = tmp.path().join("docs");
        std::fs::create_dir(&docs).unwrap();
        std::fs::write(docs.join("note.md"), "A note.").unwrap();

        let out = tmp.path().join("collection.json");
        let config = test_config(docs, out.clone());
        run_ingest(&config, true, true).await.unwrap();
        assert!(!out.exists());
    }
}
