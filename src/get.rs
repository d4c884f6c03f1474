//! The `rk get` command: print a single document by id.

use anyhow::{bail, Result};

use crate::context::AppContext;

pub fn run_get(ctx: &AppContext, id: &str) -> Result<()> {
    match ctx.collection.get(id) {
        Some(doc) => {
            println!("{}: {}", doc.id, doc.text);
            if let Some(embedding) = &doc.embedding {
                println!("[embedding: {} dims]", embedding.len());
            }
            Ok(())
        }
        None => bail!("No document with id: {id}"),
    }
}
