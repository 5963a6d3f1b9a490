//! Request handlers for protocol methods.
//!
//! Each handler implements one method of the Kindred protocol.

use crate::protocol::{
    AddMemberParams, AddRelationParams, RelationParams, Response, CYCLIC_GRAPH, DISCONNECTED,
    INTERNAL_ERROR, INVALID_PARAMS, NOT_FOUND, NO_ROOT, SAME_IDENTITY,
};
use crate::ServerContext;
use kindred_core::{Person, PersonId};
use kindred_graph::{
    interpret_relationship, EdgeKind, GraphStore, KinError, KinGraph, TreeBuilder,
};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, warn};

/// Maps a graph error onto a JSON-RPC error response.
pub fn kin_error(id: Option<Value>, err: KinError) -> Response {
    let code = match err {
        KinError::NotFound(_) => NOT_FOUND,
        KinError::NoRootFound => NO_ROOT,
        KinError::CyclicGraph { .. } => CYCLIC_GRAPH,
        KinError::Disconnected { .. } => DISCONNECTED,
        KinError::SameIdentity(_) => SAME_IDENTITY,
        KinError::InvalidRelation(_) | KinError::UnknownEdgeKind(_) => INVALID_PARAMS,
    };
    Response::error(id, code, err.to_string())
}

/// Handles the graph.info method.
pub async fn handle_info(ctx: &ServerContext, id: Option<Value>) -> Response {
    let g = ctx.graph.read().await;

    #[derive(Serialize)]
    struct InfoResult {
        people: usize,
        #[serde(rename = "childEdges")]
        child_edges: usize,
        #[serde(rename = "spouseEdges")]
        spouse_edges: usize,
        version: &'static str,
    }

    let stats = g.stats();
    Response::success(
        id,
        InfoResult {
            people: stats.people,
            child_edges: stats.child_edges,
            spouse_edges: stats.spouse_edges,
            version: env!("CARGO_PKG_VERSION"),
        },
    )
}

/// Handles the family.members method.
pub async fn handle_members(ctx: &ServerContext, id: Option<Value>) -> Response {
    let g = ctx.graph.read().await;
    Response::success(id, g.members())
}

/// Handles the family.spouses method. Pairs keep their stored direction.
pub async fn handle_spouses(ctx: &ServerContext, id: Option<Value>) -> Response {
    let g = ctx.graph.read().await;
    let pairs: Vec<[&Person; 2]> = g.spouse_pairs().into_iter().map(|(a, b)| [a, b]).collect();
    Response::success(id, pairs)
}

/// Handles the family.tree method.
pub async fn handle_tree(ctx: &ServerContext, id: Option<Value>) -> Response {
    let g = ctx.graph.read().await;

    match TreeBuilder::new(&*g)
        .with_max_depth(ctx.max_tree_depth)
        .build()
    {
        Ok(tree) => Response::success(id, tree),
        Err(e) => {
            warn!("Family tree failed: {}", e);
            kin_error(id, e)
        }
    }
}

/// Handles the family.relation method.
pub async fn handle_relation(
    ctx: &ServerContext,
    id: Option<Value>,
    params: RelationParams,
) -> Response {
    let g = ctx.graph.read().await;

    debug!("Relation query: {} -> {}", params.id1, params.id2);

    match interpret_relationship(&*g, PersonId::new(params.id1), PersonId::new(params.id2)) {
        Ok(relation) => Response::success(id, relation),
        Err(e) => kin_error(id, e),
    }
}

/// Applies `change` to a copy of the graph and persists the copy. The
/// shared graph is only replaced once both succeed.
fn commit<T>(
    ctx: &ServerContext,
    graph: &mut KinGraph,
    id: &Option<Value>,
    change: impl FnOnce(&mut KinGraph) -> kindred_graph::Result<T>,
) -> Result<T, Response> {
    let mut next = graph.clone();
    let value = change(&mut next).map_err(|e| kin_error(id.clone(), e))?;

    if let Err(e) = ctx.persist(&next) {
        warn!("Snapshot save failed, change discarded: {}", e);
        return Err(Response::error(id.clone(), INTERNAL_ERROR, e.to_string()));
    }

    *graph = next;
    Ok(value)
}

/// Handles the family.addMember method. Returns the new id.
pub async fn handle_add_member(
    ctx: &ServerContext,
    id: Option<Value>,
    params: AddMemberParams,
) -> Response {
    let mut g = ctx.graph.write().await;

    let person_id = match commit(ctx, &mut g, &id, |graph| graph.create_person(params)) {
        Ok(pid) => pid,
        Err(response) => return response,
    };

    info!("Added family member {}", person_id);
    Response::success(id, person_id)
}

/// Handles the family.addRelation method.
pub async fn handle_add_relation(
    ctx: &ServerContext,
    id: Option<Value>,
    params: AddRelationParams,
) -> Response {
    let kind: EdgeKind = match params.kind.parse() {
        Ok(kind) => kind,
        Err(e) => return kin_error(id, e),
    };

    let (from, to) = (PersonId::new(params.from), PersonId::new(params.to));
    let mut g = ctx.graph.write().await;

    if let Err(response) = commit(ctx, &mut g, &id, |graph| graph.create_edge(from, to, kind)) {
        return response;
    }

    info!("Added {} relation {} -> {}", kind, params.from, params.to);
    Response::success(id, "ok")
}
