// src/config/validate.rs

use petgraph::algo::toposort;
use petgraph::graphmap::DiGraphMap;

use crate::config::model::{Manifest, RawManifest};
use crate::errors::{AssetDagError, Result};

impl TryFrom<RawManifest> for Manifest {
    type Error = AssetDagError;

    fn try_from(raw: RawManifest) -> std::result::Result<Self, Self::Error> {
        validate_raw_manifest(&raw)?;
        Ok(Manifest::new_unchecked(raw))
    }
}

fn validate_raw_manifest(m: &RawManifest) -> Result<()> {
    ensure_has_assets(m)?;
    validate_project(m)?;
    validate_studios(m)?;
    validate_asset_references(m)?;
    validate_dag(m)?;
    validate_continuity(m)?;
    Ok(())
}

fn ensure_has_assets(m: &RawManifest) -> Result<()> {
    if m.asset.is_empty() {
        return Err(AssetDagError::ConfigError(
            "manifest must contain at least one [asset.<key>] section".to_string(),
        ));
    }
    Ok(())
}

fn validate_project(m: &RawManifest) -> Result<()> {
    if m.project.id.trim().is_empty() {
        return Err(AssetDagError::ConfigError(
            "[project].id must not be empty".to_string(),
        ));
    }
    let buffer = m.project.wave_buffer_hours;
    if !buffer.is_finite() || buffer < 0.0 {
        return Err(AssetDagError::ConfigError(format!(
            "[project].wave_buffer_hours must be >= 0 (got {buffer})"
        )));
    }
    Ok(())
}

fn validate_studios(m: &RawManifest) -> Result<()> {
    for (name, studio) in m.studio.iter() {
        if studio.capacity == 0 {
            return Err(AssetDagError::ConfigError(format!(
                "[studio.{name}].capacity must be >= 1 (got 0)"
            )));
        }
    }
    Ok(())
}

fn validate_asset_references(m: &RawManifest) -> Result<()> {
    for (key, asset) in m.asset.iter() {
        for dep in asset.after.iter() {
            if dep == key {
                return Err(AssetDagError::ConfigError(format!(
                    "asset '{key}' cannot depend on itself in `after`"
                )));
            }
            if !m.asset.contains_key(dep) {
                return Err(AssetDagError::ConfigError(format!(
                    "asset '{key}' has unknown dependency '{dep}' in `after`"
                )));
            }
        }
        for link in asset.links.iter() {
            if !m.asset.contains_key(&link.to) {
                return Err(AssetDagError::ConfigError(format!(
                    "asset '{key}' links to unknown asset '{}'",
                    link.to
                )));
            }
        }
    }
    Ok(())
}

fn validate_dag(m: &RawManifest) -> Result<()> {
    // Edge direction: dependency -> dependent.
    let mut graph: DiGraphMap<&str, ()> = DiGraphMap::new();

    for key in m.asset.keys() {
        graph.add_node(key.as_str());
    }
    for (key, asset) in m.asset.iter() {
        for dep in asset.after.iter() {
            graph.add_edge(dep.as_str(), key.as_str(), ());
        }
    }

    match toposort(&graph, None) {
        Ok(_order) => Ok(()),
        Err(cycle) => Err(AssetDagError::ConfigError(format!(
            "dependency cycle in manifest involving asset '{}'",
            cycle.node_id()
        ))),
    }
}

fn validate_continuity(m: &RawManifest) -> Result<()> {
    for (dimension, score) in m.continuity.scores.iter() {
        if !(0.0..=1.0).contains(score) {
            return Err(AssetDagError::ConfigError(format!(
                "[continuity].scores.{dimension} must be within [0, 1] (got {score})"
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(toml_src: &str) -> Result<Manifest> {
        let raw: RawManifest = toml::from_str(toml_src)?;
        Manifest::try_from(raw)
    }

    const HEADER: &str = "[project]\nid = \"p\"\n";

    #[test]
    fn accepts_minimal_manifest() {
        let m = parse(&format!("{HEADER}[asset.a]\nname = \"A\"\ntype = \"script\"\n")).unwrap();
        assert_eq!(m.asset.len(), 1);
        assert_eq!(m.project.wave_buffer_hours, 2.0);
        assert_eq!(m.asset["a"].effective_owner(), "shared");
    }

    #[test]
    fn rejects_empty_asset_list() {
        let err = parse(HEADER).unwrap_err();
        assert!(matches!(err, AssetDagError::ConfigError(_)));
    }

    #[test]
    fn rejects_cycles() {
        let src = format!(
            "{HEADER}[asset.a]\nname = \"A\"\ntype = \"script\"\nafter = [\"b\"]\n\
             [asset.b]\nname = \"B\"\ntype = \"music\"\nafter = [\"a\"]\n"
        );
        let err = parse(&src).unwrap_err();
        assert!(err.to_string().contains("cycle"), "{err}");
    }

    #[test]
    fn rejects_unknown_link_target() {
        let src = format!(
            "{HEADER}[asset.a]\nname = \"A\"\ntype = \"script\"\n\
             links = [{{ to = \"ghost\" }}]\n"
        );
        let err = parse(&src).unwrap_err();
        assert!(err.to_string().contains("ghost"), "{err}");
    }

    #[test]
    fn rejects_zero_capacity_and_bad_scores() {
        let asset = "[asset.a]\nname = \"A\"\ntype = \"script\"\n";
        let err = parse(&format!("{HEADER}[studio.audio]\ncapacity = 0\n{asset}")).unwrap_err();
        assert!(err.to_string().contains("capacity"), "{err}");

        let err = parse(&format!(
            "{HEADER}{asset}[continuity]\nscores = {{ style = 1.5 }}\n"
        ))
        .unwrap_err();
        assert!(err.to_string().contains("style"), "{err}");
    }

    #[test]
    fn dependency_order_puts_dependencies_first() {
        let src = format!(
            "{HEADER}[asset.a_video]\nname = \"V\"\ntype = \"video_clip\"\nafter = [\"z_script\"]\n\
             [asset.z_script]\nname = \"S\"\ntype = \"script\"\n"
        );
        let m = parse(&src).unwrap();
        assert_eq!(m.keys_in_dependency_order(), vec!["z_script", "a_video"]);
    }
}
