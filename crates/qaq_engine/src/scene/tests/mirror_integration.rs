//! Randomized structural tests for the scene mirror
//!
//! Drives long sequences of attach/detach/destroy operations and checks after
//! every step that the renderer tree still matches the node tree, and that
//! rejected operations changed nothing.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::foundation::math::Vec3;
use crate::render::{RenderBackend, RetainedScene};
use crate::scene::{NodeId, SceneError, SceneMirror};

fn snapshot(scene: &SceneMirror<RetainedScene>, ids: &[NodeId]) -> Vec<Option<(Option<NodeId>, Vec<NodeId>)>> {
    ids.iter()
        .map(|id| {
            scene
                .node(*id)
                .ok()
                .map(|node| (node.parent(), node.children().to_vec()))
        })
        .collect()
}

fn run_sequence(seed: u64, steps: usize) {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut scene = SceneMirror::with_backend(RetainedScene::new());
    let mut ids: Vec<NodeId> = (0..12).map(|i| scene.create_node(format!("n{i}"))).collect();
    scene.attach_root(ids[0]).unwrap();

    for step in 0..steps {
        let a = ids[rng.gen_range(0..ids.len())];
        let b = ids[rng.gen_range(0..ids.len())];
        let before = snapshot(&scene, &ids);

        let result = match rng.gen_range(0..10) {
            0..=4 => scene.add_child(a, b),
            5..=6 => match scene.parent(b) {
                Ok(Some(parent)) => scene.remove_child(parent, b),
                Ok(None) => scene.remove_child(a, b),
                Err(err) => Err(err),
            },
            7 => scene.set_position(b, Vec3::new(rng.gen(), rng.gen(), 0.0)),
            8 => {
                scene.destroy(b);
                let replacement = scene.create_node(format!("r{step}"));
                ids.retain(|id| scene.contains(*id));
                ids.push(replacement);
                Ok(())
            }
            _ => {
                if scene.roots().contains(&a) {
                    scene.detach_root(a)
                } else {
                    scene.attach_root(a)
                }
            }
        };

        if let Err(err) = &result {
            assert!(
                matches!(
                    err,
                    SceneError::InvalidHierarchy { .. }
                        | SceneError::NotAChild { .. }
                        | SceneError::NotARoot(_)
                        | SceneError::NodeNotFound(_)
                ),
                "unexpected error {err:?}"
            );
            assert_eq!(snapshot(&scene, &ids), before, "rejected operation mutated the tree at step {step}");
        }

        if let Err(err) = scene.verify_mirror() {
            panic!("seed {seed} step {step}: {err}");
        }
        // A host drains notifications once per tick
        scene.events_mut().dispatch();
    }
}

#[test]
fn test_random_sequences_keep_mirror_in_sync() {
    for seed in 0..16 {
        run_sequence(seed, 300);
    }
}

#[test]
fn test_undrained_notifications_stay_bounded() {
    let mut scene = SceneMirror::with_backend(RetainedScene::new());
    scene.events_mut().set_max_pending(64);
    let node = scene.create_node("n");
    scene.attach_root(node).unwrap();

    for i in 0..1000 {
        scene.set_position(node, Vec3::new(i as f32, 0.0, 0.0)).unwrap();
    }
    assert!(scene.events().pending() <= 64);
}

#[test]
fn test_live_objects_match_live_nodes() {
    let mut scene = SceneMirror::with_backend(RetainedScene::new());
    let root = scene.create_node("root");
    let children: Vec<NodeId> = (0..5).map(|i| scene.create_node(format!("c{i}"))).collect();
    scene.attach_root(root).unwrap();
    for child in &children {
        scene.add_child(root, *child).unwrap();
    }

    let live = scene.depth_first().len();
    assert_eq!(live, 6);
    assert_eq!(scene.backend().object_count(), live);

    scene.remove_child(root, children[2]).unwrap();
    scene.destroy(children[4]);
    assert_eq!(scene.backend().object_count(), scene.depth_first().len());

    let expected: Vec<_> = [children[0], children[1], children[3]]
        .iter()
        .map(|id| scene.visual_of(*id).unwrap())
        .collect();
    let root_object = scene.visual_of(root);
    assert_eq!(scene.backend().children_of(root_object), expected);
}

#[test]
fn test_reattach_preserves_child_order() {
    let mut scene = SceneMirror::with_backend(RetainedScene::new());
    let root = scene.create_node("root");
    let a = scene.create_node("a");
    let b = scene.create_node("b");
    let c = scene.create_node("c");
    for child in [a, b, c] {
        scene.add_child(root, child).unwrap();
    }

    scene.attach_root(root).unwrap();
    scene.detach_root(root).unwrap();
    scene.attach_root(root).unwrap();

    let objects: Vec<_> = [a, b, c].iter().map(|id| scene.visual_of(*id).unwrap()).collect();
    assert_eq!(scene.backend().children_of(scene.visual_of(root)), objects);
    scene.verify_mirror().unwrap();
}
