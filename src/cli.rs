use crate::app::dto::{ArtifactRequest, GraphResponse, LinkageRequest, TreeNodeDto, TreeResponse};
use crate::app::engine::LinkageEngine;
use anyhow::Result;
use std::path::PathBuf;

/// Runs the static linkage check over `jars` and prints the report.
/// Returns the number of unresolved references.
pub fn run_linkage(
    engine: &LinkageEngine,
    jars: &[PathBuf],
    resolve_against: &[PathBuf],
    json: bool,
) -> Result<usize> {
    let response = engine.linkage(LinkageRequest {
        jars: jars.to_vec(),
        resolve_against: resolve_against.to_vec(),
    })?;
    if json {
        println!("{}", serde_json::to_string_pretty(&response)?);
    } else {
        println!("{}", response.report);
    }
    Ok(response.unresolved.len())
}

pub fn print_graph(
    engine: &LinkageEngine,
    coordinates: &[String],
    complete: bool,
    conflicts_only: bool,
    json: bool,
) -> Result<()> {
    let graph = engine.dependency_graph(coordinates, complete)?;
    let response = GraphResponse::from(&graph);
    if json {
        println!("{}", serde_json::to_string_pretty(&response)?);
        return Ok(());
    }

    if !conflicts_only {
        for path in graph.list() {
            println!("{}", path);
        }
    }

    if response.conflicts.is_empty() {
        if conflicts_only {
            println!("No version conflicts.");
        }
        return Ok(());
    }

    if !conflicts_only {
        println!();
    }
    println!("Version conflicts:");
    for conflict in &response.conflicts {
        println!("  {} {}", conflict.key, conflict.versions.join(", "));
        for version in &conflict.versions {
            let (group_id, artifact_id) = conflict
                .key
                .split_once(':')
                .unwrap_or((conflict.key.as_str(), ""));
            for path in graph
                .paths_to(group_id, artifact_id)
                .filter(|p| p.leaf().is_some_and(|a| &a.version == version))
            {
                println!("    {}", path);
            }
        }
    }
    Ok(())
}

pub fn print_direct(engine: &LinkageEngine, coordinate: &str, json: bool) -> Result<()> {
    let response = engine.direct(ArtifactRequest {
        artifact: coordinate.to_string(),
    })?;
    if json {
        println!("{}", serde_json::to_string_pretty(&response)?);
    } else {
        for dependency in &response.dependencies {
            println!("{}", dependency);
        }
    }
    Ok(())
}

pub fn print_tree(engine: &LinkageEngine, coordinate: &str, json: bool) -> Result<()> {
    let tree = engine.compile_tree(coordinate)?;
    let response = TreeResponse::from(&tree);
    if json {
        println!("{}", serde_json::to_string_pretty(&response)?);
        return Ok(());
    }
    if let Some(root) = &response.root {
        print!("{}", render_tree(root));
    }
    Ok(())
}

/// Indented rendering, one node per line: `<coordinate> [<scope>]`.
pub fn render_tree(root: &TreeNodeDto) -> String {
    fn walk(node: &TreeNodeDto, depth: usize, out: &mut String) {
        out.push_str(&"  ".repeat(depth));
        out.push_str(&node.artifact);
        if depth > 0 {
            out.push_str(&format!(" [{}]", node.scope));
        }
        if node.optional {
            out.push_str(" (optional)");
        }
        out.push('\n');
        for child in &node.children {
            walk(child, depth + 1, out);
        }
    }

    let mut out = String::new();
    walk(root, 0, &mut out);
    out
}

/// Resolves the artifact's compile-time classpath and prints its linkage report.
/// Returns the number of unresolved references.
pub fn check_artifact(engine: &LinkageEngine, coordinate: &str, json: bool) -> Result<usize> {
    let response = engine.check_artifact(coordinate)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&response)?);
    } else {
        println!("{}", response.report);
    }
    Ok(response.unresolved.len())
}
