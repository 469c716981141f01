// convert.rs - Replace a standin proxy with a reference to its native scene file
use anyhow::{Context, Result};
use log::info;

use crate::proxy::HostProxy;
use crate::standin::Standin;
use crate::traits::{ProxyHandle, SceneHost};

/// `base`, then `base1`, `base2`, ... until the host reports it free
pub fn unique_namespace<H: SceneHost + ?Sized>(host: &H, base: &str) -> String {
    if !host.namespace_exists(base) {
        return base.to_string();
    }
    let mut suffix = 1usize;
    loop {
        let candidate = format!("{}{}", base, suffix);
        if !host.namespace_exists(&candidate) {
            return candidate;
        }
        suffix += 1;
    }
}

/// Reference the native file in place of the proxy.
///
/// The new reference lands under the proxy transform's parent with the
/// proxy's world matrix, and the proxy transform is hidden. Steps already
/// applied are not rolled back when a later one fails.
pub fn convert_to_native<H: SceneHost>(proxy: &mut HostProxy<'_, H>, standin: &Standin) -> Result<H::Node> {
    let native = standin.native_path();
    let world = proxy.world_transform();
    let transform = proxy.transform_node();

    let host = proxy.host();
    let parent = host.parent(transform);
    let namespace = unique_namespace(&*host, standin.standin_name());

    let reference = host
        .create_reference(&native, &namespace)
        .with_context(|| format!("Failed to reference {:?}", native))?;
    host.reparent(reference, parent)
        .with_context(|| format!("Failed to parent reference {}", namespace))?;
    host.set_world_transform(reference, world)
        .with_context(|| format!("Failed to place reference {}", namespace))?;
    host.set_visible(transform, false)
        .with_context(|| format!("Failed to hide {}", standin.object_name()))?;

    info!(
        "{}: converted to {:?} under namespace {}",
        standin.object_name(),
        native,
        namespace
    );
    Ok(reference)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Convention;
    use crate::scene::{JsonScene, NodeKind, SceneDocument, SceneNode};
    use crate::testing::AssetTree;
    use glam::{Mat4, Vec3};

    fn scene_with_rock(tree: &AssetTree) -> JsonScene {
        let dso = tree.path("Rock_HD/v002/Rock_HD.ass");
        JsonScene::from_document(SceneDocument {
            nodes: vec![
                SceneNode::transform("set", None, Mat4::from_translation(Vec3::new(0.0, 0.0, 4.0))),
                SceneNode::transform("rock01", Some("set"), Mat4::from_scale(Vec3::splat(2.0))),
                SceneNode::standin("rock01Shape", "rock01", &dso.to_string_lossy()),
            ],
            selection: vec!["rock01".to_string()],
        })
        .unwrap()
    }

    #[test]
    fn converts_in_place() {
        let tree = AssetTree::new("convert").unwrap();
        tree.add_version("Rock", "HD", "v002").unwrap();
        let mut scene = scene_with_rock(&tree);
        let world = scene.world_transform(1);

        let mut proxy = HostProxy::new(&mut scene, 2).unwrap();
        let standin = Standin::parse(&proxy, &Convention::default()).unwrap();
        let reference = convert_to_native(&mut proxy, &standin).unwrap();

        let node = scene.node(reference).unwrap().clone();
        assert_eq!(node.name, "Rock:Rock_HD");
        assert_eq!(node.parent.as_deref(), Some("set"));
        assert_eq!(
            node.kind,
            NodeKind::Reference {
                path: tree.path("Rock_HD/v002/Rock_HD.ma").to_string_lossy().into_owned(),
                namespace: "Rock".to_string(),
            }
        );
        assert!(scene.world_transform(reference).abs_diff_eq(world, 1e-5));
        assert!(!scene.node(1).unwrap().visible);
    }

    #[test]
    fn second_conversion_gets_fresh_namespace() {
        let tree = AssetTree::new("convert-twice").unwrap();
        tree.add_version("Rock", "HD", "v002").unwrap();
        let mut scene = scene_with_rock(&tree);

        for expected in ["Rock", "Rock1", "Rock2"] {
            let mut proxy = HostProxy::new(&mut scene, 2).unwrap();
            let standin = Standin::parse(&proxy, &Convention::default()).unwrap();
            let reference = convert_to_native(&mut proxy, &standin).unwrap();
            assert_eq!(scene.node_name(reference), format!("{}:Rock_HD", expected));
        }
        assert_eq!(unique_namespace(&scene, "Rock"), "Rock3");
        assert_eq!(unique_namespace(&scene, "Tree"), "Tree");
    }

    #[test]
    fn missing_native_file_propagates() {
        let tree = AssetTree::new("convert-missing").unwrap();
        tree.add("Rock", "HD", "v002", "ass").unwrap();
        let mut scene = scene_with_rock(&tree);

        let mut proxy = HostProxy::new(&mut scene, 2).unwrap();
        let standin = Standin::parse(&proxy, &Convention::default()).unwrap();
        assert!(convert_to_native(&mut proxy, &standin).is_err());
        assert!(scene.node(1).unwrap().visible);
        assert_eq!(scene.nodes().len(), 3);
    }
}
