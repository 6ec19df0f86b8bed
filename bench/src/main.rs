use pairgraph_core::record::write_records;
use pairgraph_core::{
    solve, EdgeRecord, Graph, NodeId, ShortcutPolicy, SolveOptions, NODE_ID_WIDTH,
};
use std::collections::VecDeque;
use std::fs::File;
use std::io::BufWriter;
use std::time::Instant;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();

    let mode = args.get(1).map(|s| s.as_str()).unwrap_or("all");
    let node_count: u64 = args.get(2).and_then(|s| s.parse().ok()).unwrap_or(2_000);
    let write_path = args.get(3);

    if mode == "help" || mode == "--help" {
        println!("Usage: pairgraph-bench [mode] [node_count] [write_path]");
        println!();
        println!("Modes:");
        println!("  all         Run all generators and benchmark each (default)");
        println!("  lsystem     Fractal branching tree (deep paths)");
        println!("  scalefree   Preferential attachment via edge sampling (hub-and-spoke)");
        println!("  smallworld  Watts-Strogatz ring lattice + shortcuts");
        println!("  random      Erdos-Renyi uniform random edges");
        println!("  barbell     Two dense cliques connected by a thin bridge");
        println!("  dla         Diffusion-limited aggregation (organic branching)");
        println!();
        println!("Default node_count: 2000 (closures grow quadratically on cyclic graphs)");
        println!("write_path: with a single mode, also write the records as a pair file");
        return;
    }

    println!("pairgraph-bench");
    println!("===============");
    println!();

    let generators: Vec<(&str, fn(u64) -> Vec<EdgeRecord>)> = match mode {
        "lsystem" => vec![("L-system tree", gen_lsystem)],
        "scalefree" => vec![("Scale-free (edge sampling)", gen_scale_free)],
        "smallworld" => vec![("Small-world (Watts-Strogatz)", gen_small_world)],
        "random" => vec![("Erdos-Renyi random", gen_random)],
        "barbell" => vec![("Barbell (clique-bridge-clique)", gen_barbell)],
        "dla" => vec![("DLA (organic branching)", gen_dla)],
        "all" => vec![
            ("L-system tree", gen_lsystem as fn(u64) -> Vec<EdgeRecord>),
            ("Scale-free (edge sampling)", gen_scale_free),
            ("Small-world (Watts-Strogatz)", gen_small_world),
            ("Erdos-Renyi random", gen_random),
            ("Barbell (clique-bridge-clique)", gen_barbell),
            ("DLA (organic branching)", gen_dla),
        ],
        _ => {
            eprintln!("Unknown mode: {}. Use --help for options.", mode);
            return;
        }
    };

    for (name, generator) in &generators {
        let records = run_benchmark(name, *generator, node_count);
        if let (Some(path), 1) = (write_path, generators.len()) {
            match write_pair_file(path, &records) {
                Ok(n) => println!("Wrote {} records to {}", n, path),
                Err(e) => eprintln!("Failed to write {}: {}", path, e),
            }
        }
    }
}

fn write_pair_file(path: &str, records: &[EdgeRecord]) -> std::io::Result<usize> {
    let mut w = BufWriter::new(File::create(path)?);
    write_records(&mut w, records)
}

fn run_benchmark(name: &str, generator: fn(u64) -> Vec<EdgeRecord>, node_count: u64) -> Vec<EdgeRecord> {
    println!("--- {} ---", name);
    println!("Target: {} nodes", node_count);

    let t = Instant::now();
    let records = generator(node_count);
    let gen_time = t.elapsed();
    println!(
        "Generated {} records in {:.2}s",
        records.len(),
        gen_time.as_secs_f64()
    );

    let mut graph = Graph::with_capacity(node_count as usize);
    let stats = graph.build(records.iter().copied());
    println!(
        "Built in {:.1}ms: {} sources, {} connections, ~{:.1}MB",
        stats.elapsed.as_secs_f64() * 1000.0,
        stats.nodes,
        stats.edges,
        graph.memory_usage() as f64 / 1_048_576.0
    );

    println!();
    println!(
        "{:>10} {:>10} {:>10} {:>10} {:>12} {:>10}",
        "shortcut", "copied", "traversed", "folds", "avg closure", "time"
    );
    println!(
        "{:->10} {:->10} {:->10} {:->10} {:->12} {:->10}",
        "", "", "", "", "", ""
    );

    for (label, policy) in [
        ("dual-side", ShortcutPolicy::DualSide),
        ("disabled", ShortcutPolicy::Disabled),
    ] {
        let (table, stats) = solve(&graph, &SolveOptions { shortcut: policy });
        let total: usize = table.iter().map(|e| e.len()).sum();
        let avg = if table.is_empty() {
            0.0
        } else {
            total as f64 / table.len() as f64
        };
        println!(
            "{:>10} {:>10} {:>10} {:>10} {:>12.1} {:>8.1}ms",
            label,
            stats.shortcuts,
            stats.traversals,
            stats.folds,
            avg,
            stats.elapsed.as_secs_f64() * 1000.0
        );
    }
    println!();

    records
}

// ---------------------------------------------------------------------------
// Generators: O(n + edges), single-threaded, deterministic
// ---------------------------------------------------------------------------

/// Simple LCG for deterministic, fast pseudo-random numbers.
struct FastRng(u64);

impl FastRng {
    fn new(seed: u64) -> Self {
        Self(seed)
    }
    fn next(&mut self, max: u64) -> u64 {
        self.0 = self.0.wrapping_mul(6364136223846793005).wrapping_add(1);
        (self.0 >> 33) % max
    }
    fn next_f64(&mut self) -> f64 {
        self.0 = self.0.wrapping_mul(6364136223846793005).wrapping_add(1);
        (self.0 >> 11) as f64 / (1u64 << 53) as f64
    }
    /// Edge weight in [0, 100).
    fn weight(&mut self) -> f32 {
        (self.next_f64() * 100.0) as f32
    }
}

/// `c_<n>`, truncated to the id field width (exact for n below 10^10).
fn node(n: u64) -> NodeId {
    let text = format!("c_{}", n);
    let len = text.len().min(NODE_ID_WIDTH);
    let mut raw = [0u8; NODE_ID_WIDTH];
    raw[..len].copy_from_slice(&text.as_bytes()[..len]);
    NodeId::from_padded(&raw)
}

fn edge(rng: &mut FastRng, from: u64, to: u64) -> EdgeRecord {
    EdgeRecord {
        source: node(from),
        target: node(to),
        weight: rng.weight(),
    }
}

/// L-system fractal tree: deep branching with self-similar structure.
///
/// Each node spawns `branching` children. Acyclic, so every closure comes
/// from traversal and folds of already-solved subtrees.
fn gen_lsystem(node_count: u64) -> Vec<EdgeRecord> {
    let mut records = Vec::with_capacity(node_count as usize);
    let mut rng = FastRng::new(42);

    let branching = 3u64;
    let mut next_id: u64 = 1;
    let mut frontier: Vec<u64> = vec![0];

    while next_id < node_count && !frontier.is_empty() {
        let mut next_frontier = Vec::with_capacity(frontier.len() * branching as usize);
        for &parent in &frontier {
            for _ in 0..branching {
                if next_id >= node_count {
                    break;
                }
                let child = next_id;
                next_id += 1;
                records.push(edge(&mut rng, parent, child));
                next_frontier.push(child);
            }
        }
        frontier = next_frontier;
    }

    records
}

/// Scale-free via edge-list sampling (O(edges), not O(n²)).
///
/// Preferential attachment by picking a random existing edge endpoint.
/// 10% of attachments add the reverse edge too, creating 2-cycles.
fn gen_scale_free(node_count: u64) -> Vec<EdgeRecord> {
    let edges_per_node = 5u64;
    let mut records = Vec::with_capacity((node_count * edges_per_node) as usize);
    let mut rng = FastRng::new(12345);

    let mut edge_endpoints: Vec<u64> = Vec::with_capacity((node_count * edges_per_node * 2) as usize);

    // Seed: small clique
    let seed = 5u64.min(node_count);
    for i in 0..seed {
        for j in (i + 1)..seed {
            records.push(edge(&mut rng, i, j));
            edge_endpoints.push(i);
            edge_endpoints.push(j);
        }
    }

    for new_node in seed..node_count {
        let attach = edges_per_node.min(new_node);
        for _ in 0..attach {
            let idx = rng.next(edge_endpoints.len() as u64) as usize;
            let target = edge_endpoints[idx];
            if target != new_node {
                records.push(edge(&mut rng, new_node, target));
                if rng.next(10) == 0 {
                    records.push(edge(&mut rng, target, new_node));
                }
                edge_endpoints.push(new_node);
                edge_endpoints.push(target);
            }
        }
    }

    records
}

/// Small-world (Watts-Strogatz): ring lattice + random rewiring.
///
/// The ring makes one large cycle, so closures are near-complete.
fn gen_small_world(node_count: u64) -> Vec<EdgeRecord> {
    let k = 4u64;
    let p = 0.05f64;
    let mut records = Vec::with_capacity((node_count * k) as usize);
    let mut rng = FastRng::new(67890);

    for i in 0..node_count {
        for j in 1..=k {
            let neighbor = (i + j) % node_count;
            if rng.next_f64() < p {
                let rewired = rng.next(node_count);
                let to = if rewired != i { rewired } else { neighbor };
                records.push(edge(&mut rng, i, to));
            } else {
                records.push(edge(&mut rng, i, neighbor));
            }
        }
    }

    records
}

/// Erdos-Renyi: uniform random edges, ~4 per node.
fn gen_random(node_count: u64) -> Vec<EdgeRecord> {
    let target_edges = node_count * 4;
    let mut records = Vec::with_capacity(target_edges as usize);
    let mut rng = FastRng::new(54321);

    for _ in 0..target_edges {
        let from = rng.next(node_count);
        let to = rng.next(node_count);
        if from != to {
            records.push(edge(&mut rng, from, to));
        }
    }

    records
}

/// Barbell: two dense cliques joined by a one-way chain of bridge nodes.
///
/// Clique A reaches everything in B; B reaches nothing in A.
fn gen_barbell(node_count: u64) -> Vec<EdgeRecord> {
    let bridge_len = 10u64.min(node_count / 2);
    let clique_size = (node_count - bridge_len) / 2;
    let mut records = Vec::with_capacity((clique_size * 20 + bridge_len) as usize);
    let mut rng = FastRng::new(99999);

    if clique_size < 2 {
        return records;
    }

    // Clique A: nodes 0..clique_size, each connected to ~10 random others
    for i in 0..clique_size {
        for _ in 0..10u64.min(clique_size - 1) {
            let target = rng.next(clique_size);
            if target != i {
                records.push(edge(&mut rng, i, target));
            }
        }
    }

    let bridge_start = clique_size;
    for i in 0..bridge_len {
        let id = bridge_start + i;
        let from = if i == 0 { clique_size - 1 } else { id - 1 };
        records.push(edge(&mut rng, from, id));
    }

    let b_start = bridge_start + bridge_len;
    records.push(edge(&mut rng, b_start - 1, b_start));

    for i in 0..clique_size {
        for _ in 0..10u64.min(clique_size - 1) {
            let target = rng.next(clique_size);
            if target != i {
                records.push(edge(&mut rng, b_start + i, b_start + target));
            }
        }
    }

    records
}

/// DLA (Diffusion-Limited Aggregation): organic branching growth.
///
/// Each new node attaches to a recent "surface" node, with occasional
/// long-range links back toward older nodes.
fn gen_dla(node_count: u64) -> Vec<EdgeRecord> {
    let mut records = Vec::with_capacity((node_count * 2) as usize);
    let mut rng = FastRng::new(77777);

    // VecDeque for O(1) pop_front when evicting oldest surface nodes.
    let mut surface: VecDeque<u64> = VecDeque::with_capacity(1001);
    surface.push_back(0);
    let surface_max = 1000usize;

    for new_node in 1..node_count {
        let attach_to = surface[rng.next(surface.len() as u64) as usize];
        records.push(edge(&mut rng, new_node, attach_to));

        // 10% chance of a reverse link (creates loops)
        if rng.next(10) == 0 && new_node > 1 {
            let other = rng.next(new_node);
            records.push(edge(&mut rng, other, new_node));
        }

        surface.push_back(new_node);
        if surface.len() > surface_max {
            surface.pop_front();
        }
    }

    records
}
