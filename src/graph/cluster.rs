use tracing::debug;

use super::model::ContentGraph;

/// Disjoint-set forest over node indices.
pub struct UnionFind {
    parent: Vec<usize>,
    rank: Vec<u8>,
}

impl UnionFind {
    pub fn new(size: usize) -> Self {
        Self {
            parent: (0..size).collect(),
            rank: vec![0; size],
        }
    }

    pub fn find(&mut self, index: usize) -> usize {
        let mut root = index;
        while self.parent[root] != root {
            root = self.parent[root];
        }

        let mut cursor = index;
        while self.parent[cursor] != root {
            let next = self.parent[cursor];
            self.parent[cursor] = root;
            cursor = next;
        }
        root
    }

    pub fn union(&mut self, a: usize, b: usize) {
        let root_a = self.find(a);
        let root_b = self.find(b);
        if root_a == root_b {
            return;
        }

        match self.rank[root_a].cmp(&self.rank[root_b]) {
            std::cmp::Ordering::Less => self.parent[root_a] = root_b,
            std::cmp::Ordering::Greater => self.parent[root_b] = root_a,
            std::cmp::Ordering::Equal => {
                self.parent[root_b] = root_a;
                self.rank[root_a] = self.rank[root_a].saturating_add(1);
            }
        }
    }
}

/// Content nodes split into connected clusters and isolated singletons.
///
/// Clusters are ordered by the position of their first member in the input,
/// members and isolated nodes keep input order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Partition {
    pub clusters: Vec<Vec<usize>>,
    pub isolated: Vec<usize>,
}

impl Partition {
    pub fn cluster_count(&self) -> usize {
        self.clusters.len()
    }

    pub fn isolated_count(&self) -> usize {
        self.isolated.len()
    }
}

pub fn detect_clusters(graph: &ContentGraph) -> Partition {
    let node_count = graph.nodes.len();
    let mut forest = UnionFind::new(node_count);
    let mut has_edge = vec![false; node_count];

    for edge in &graph.edges {
        if edge.source >= node_count || edge.target >= node_count {
            continue;
        }
        forest.union(edge.source, edge.target);
        has_edge[edge.source] = true;
        has_edge[edge.target] = true;
    }

    let mut group_of_root = vec![usize::MAX; node_count];
    let mut groups: Vec<Vec<usize>> = Vec::new();
    for index in 0..node_count {
        let root = forest.find(index);
        if group_of_root[root] == usize::MAX {
            group_of_root[root] = groups.len();
            groups.push(Vec::new());
        }
        groups[group_of_root[root]].push(index);
    }

    let mut partition = Partition::default();
    for group in groups {
        if group.len() > 1 || has_edge[group[0]] {
            partition.clusters.push(group);
        } else {
            partition.isolated.push(group[0]);
        }
    }

    debug!(
        clusters = partition.cluster_count(),
        isolated = partition.isolated_count(),
        "cluster detection finished"
    );
    partition
}
