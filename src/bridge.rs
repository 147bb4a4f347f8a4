//! Manifest-in, plan-out entry points for hosts outside Rust.
//!
//! Components live on the host side, so wrappers and contents are replaced by
//! inert stand-ins; only the composition plan crosses the boundary.

#[cfg(feature = "napi")]
use napi_derive::napi;

use crate::error::PlanError;
use crate::manifest::{ComponentRegistry, RouterManifest};
use crate::resolve::{resolve_match, CompositionPlan, RouteMatch};

/// Resolves the plan for `route` against a JSON manifest.
pub fn plan_from_manifest(manifest_json: &str, route: &RouteMatch) -> Result<CompositionPlan, PlanError> {
    let manifest = RouterManifest::from_json(manifest_json)?;
    let registry = ComponentRegistry::inert_for(&manifest);
    let tree = manifest.build_tree(&registry)?;
    let composition = resolve_match(&tree, route)?;
    Ok(composition.plan())
}

/// JSON form of [`plan_from_manifest`]: `{ "plan": ..., "fingerprint": ... }`
/// on success, `{ "error": "..." }` otherwise.
pub fn plan_json(manifest_json: &str, route: &RouteMatch) -> String {
    let output = match plan_from_manifest(manifest_json, route) {
        Ok(plan) => {
            let fingerprint = plan.fingerprint();
            serde_json::json!({ "plan": plan, "fingerprint": fingerprint })
        }
        Err(e) => {
            tracing::debug!(error = %e, "plan resolution failed");
            serde_json::json!({ "error": e.to_string() })
        }
    };
    output.to_string()
}

#[cfg(feature = "napi")]
#[napi]
pub fn resolve_composition_native(manifest_json: String, page_name: String) -> String {
    plan_json(&manifest_json, &RouteMatch::named(page_name))
}

#[cfg(feature = "napi")]
#[napi]
pub fn resolve_match_native(manifest_json: String, match_json: String) -> String {
    match serde_json::from_str::<RouteMatch>(&match_json) {
        Ok(route) => plan_json(&manifest_json, &route),
        Err(e) => serde_json::json!({ "error": format!("invalid route match: {}", e) }).to_string(),
    }
}
