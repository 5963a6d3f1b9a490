//! CLI command implementations.

use crate::config::{self, KindredConfig};
use colored::Colorize;
use kindred_core::{NewPerson, PersonId};
use kindred_graph::{
    describe, interpret_relationship, EdgeKind, FamilyTreeNode, GraphStore, KinGraph,
    RelationEntry, SnapshotStore, TreeBuilder,
};
use kindred_server::{KindredServer, ServerConfig};
use std::fs;
use std::path::Path;
use tracing::debug;

type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;

/// Opened workspace: its config, the snapshot store and the loaded graph.
struct Workspace {
    config: KindredConfig,
    store: SnapshotStore,
    graph: KinGraph,
}

impl Workspace {
    fn open(dir: &Path) -> Result<Self> {
        if !config::state_dir(dir).exists() {
            return Err(format!(
                "Kindred not initialized in {} (run `kindred init`)",
                dir.display()
            )
            .into());
        }
        let store = SnapshotStore::open(config::db_path(dir))?;
        let graph = store.load_or_default()?;
        let config = KindredConfig::load(dir)?;
        debug!("Loaded {} people from {}", graph.node_count(), dir.display());
        Ok(Self {
            config,
            store,
            graph,
        })
    }

    fn save(&self) -> Result<()> {
        self.store.save(&self.graph)?;
        Ok(())
    }
}

/// Initialize Kindred in a directory.
pub fn init(dir: &Path) -> Result<()> {
    let state_dir = config::state_dir(dir);

    if state_dir.exists() {
        println!("{} Already initialized", "✓".green());
        return Ok(());
    }

    fs::create_dir_all(&state_dir)?;
    KindredConfig::default().save(dir)?;
    SnapshotStore::open(config::db_path(dir))?.save(&KinGraph::new())?;

    println!("{} Initialized Kindred in {}", "✓".green(), dir.display());
    println!("  Run {} to add someone", "kindred add <name> <surname>".cyan());

    Ok(())
}

/// Add a person.
pub fn add(dir: &Path, name: &str, surname: &str) -> Result<()> {
    let mut ws = Workspace::open(dir)?;
    let id = ws.graph.create_person(NewPerson::new(name, surname))?;
    ws.save()?;

    println!("{} Added {} {} as #{}", "✓".green(), name, surname, id.to_string().cyan());
    Ok(())
}

/// Relate two people.
pub fn link(dir: &Path, from: u64, to: u64, kind: &str) -> Result<()> {
    let kind: EdgeKind = kind.parse()?;
    let mut ws = Workspace::open(dir)?;
    ws.graph
        .create_edge(PersonId::new(from), PersonId::new(to), kind)?;
    ws.save()?;

    println!("{} {} #{} -> #{}", "✓".green(), kind.to_string().yellow(), from, to);
    Ok(())
}

/// List everyone.
pub fn members(dir: &Path, json: bool) -> Result<()> {
    let ws = Workspace::open(dir)?;
    let people = ws.graph.members();

    if json {
        println!("{}", serde_json::to_string_pretty(&people)?);
        return Ok(());
    }

    if people.is_empty() {
        println!("No family members yet");
        return Ok(());
    }

    for person in people {
        println!(
            "  {} {}",
            format!("#{}", person.id).dimmed(),
            person.display_name().cyan()
        );
    }
    Ok(())
}

/// List every marriage.
pub fn spouses(dir: &Path, json: bool) -> Result<()> {
    let ws = Workspace::open(dir)?;
    let pairs = ws.graph.spouse_pairs();

    if json {
        println!("{}", serde_json::to_string_pretty(&pairs)?);
        return Ok(());
    }

    if pairs.is_empty() {
        println!("No marriages recorded");
        return Ok(());
    }

    for (a, b) in pairs {
        println!("  {} {} {}", a.display_name().cyan(), "⚭".yellow(), b.display_name().cyan());
    }
    Ok(())
}

/// Print the family tree from the oldest root ancestor.
pub fn tree(dir: &Path, json: bool) -> Result<()> {
    let ws = Workspace::open(dir)?;
    let tree = TreeBuilder::new(&ws.graph)
        .with_max_depth(ws.config.max_tree_depth)
        .build()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&tree)?);
        return Ok(());
    }

    print_tree(&tree, 0);
    println!();
    println!(
        "  {} {} people, {} generations",
        "Tree:".dimmed(),
        tree.size(),
        tree.depth()
    );
    Ok(())
}

fn print_tree(node: &FamilyTreeNode, depth: usize) {
    let indent = "    ".repeat(depth);
    println!(
        "{}{} {}",
        indent,
        node.display_name.cyan().bold(),
        format!("#{}", node.person_ref.id).dimmed()
    );
    for marriage in &node.marriages {
        println!(
            "{}  {} {} {}",
            indent,
            "⚭".yellow(),
            marriage.spouse.display_name,
            format!("#{}", marriage.spouse.person_ref.id).dimmed()
        );
        for child in &marriage.children {
            print_tree(child, depth + 1);
        }
    }
}

/// Explain how two people are related.
pub fn relation(dir: &Path, id1: u64, id2: u64, json: bool) -> Result<()> {
    let ws = Workspace::open(dir)?;
    let relation = interpret_relationship(&ws.graph, PersonId::new(id1), PersonId::new(id2))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&relation)?);
        return Ok(());
    }

    let line: Vec<String> = relation
        .iter()
        .map(|entry| match entry {
            RelationEntry::Person(p) => p.display_name().cyan().to_string(),
            RelationEntry::Relation(t) => t.as_str().yellow().to_string(),
        })
        .collect();
    println!("  {}", line.join(" → "));
    debug!("{}", describe(&relation));
    Ok(())
}

/// Show store status.
pub fn status(dir: &Path) -> Result<()> {
    if !config::state_dir(dir).exists() {
        println!("{} Kindred not initialized in this directory", "✗".red());
        println!("  Run {} to initialize", "kindred init".cyan());
        return Ok(());
    }

    let ws = Workspace::open(dir)?;
    let stats = ws.graph.stats();

    println!("{}", "Kindred Status".cyan().bold());
    println!();
    println!("  {} {}", "People:".dimmed(), stats.people);
    println!("  {} {}", "Parent links:".dimmed(), stats.child_edges);
    println!("  {} {}", "Marriages:".dimmed(), stats.spouse_edges);
    match ws.graph.find_oldest_root_person() {
        Ok(root) => println!("  {} {}", "Root:".dimmed(), root.display_name()),
        Err(e) => println!("  {} {}", "Root:".dimmed(), e.to_string().yellow()),
    }

    Ok(())
}

/// Export the graph to JSON.
pub fn export(dir: &Path, output: &Path) -> Result<()> {
    let ws = Workspace::open(dir)?;
    let stats = ws.graph.stats();

    let export = serde_json::json!({
        "version": ws.config.version,
        "stats": {
            "people": stats.people,
            "childEdges": stats.child_edges,
            "spouseEdges": stats.spouse_edges
        },
        "people": ws.graph.members(),
        "relations": ws.graph.export_edges()
    });

    fs::write(output, serde_json::to_string_pretty(&export)?)?;
    println!("{} Exported to {}", "✓".green(), output.display());

    Ok(())
}

/// Start the Kindred server.
pub async fn serve(dir: &Path, port: Option<u16>, headless: bool) -> Result<()> {
    let ws = Workspace::open(dir)?;
    let bind_addr = if headless {
        "0.0.0.0".to_string()
    } else {
        ws.config.bind.clone()
    };
    let port = port.unwrap_or(ws.config.port);

    if headless {
        println!("{}", "Starting Kindred server in headless mode...".cyan());
    } else {
        println!("{}", "Starting Kindred server...".cyan());
    }

    println!(
        "{} Loaded {} people",
        "✓".green(),
        ws.graph.node_count()
    );

    let addr = format!("{}:{}", bind_addr, port).parse()?;
    let config = ServerConfig {
        addr,
        max_tree_depth: ws.config.max_tree_depth,
    };
    let server = KindredServer::new(ws.graph, config).with_snapshot(ws.store);

    println!("{} Listening on ws://{}:{}", "✓".green(), bind_addr, port);
    if headless {
        println!("  Headless mode: accepting connections from any host");
    }
    println!("  Press {} to stop", "Ctrl+C".cyan());

    server.run().await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_commands_require_init() {
        let dir = tempdir().unwrap();
        assert!(add(dir.path(), "Ann", "Lee").is_err());
    }

    #[test]
    fn test_add_and_link_persist() {
        let dir = tempdir().unwrap();
        init(dir.path()).unwrap();
        add(dir.path(), "Mum", "Lee").unwrap();
        add(dir.path(), "Ann", "Lee").unwrap();
        link(dir.path(), 0, 1, "child").unwrap();

        let ws = Workspace::open(dir.path()).unwrap();
        assert_eq!(ws.graph.node_count(), 2);
        assert_eq!(ws.graph.stats().child_edges, 1);
    }

    #[test]
    fn test_link_rejects_unknown_kind() {
        let dir = tempdir().unwrap();
        init(dir.path()).unwrap();
        add(dir.path(), "A", "Lee").unwrap();
        add(dir.path(), "B", "Lee").unwrap();
        assert!(link(dir.path(), 0, 1, "friend").is_err());
    }
}
