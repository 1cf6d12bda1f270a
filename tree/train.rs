#[cfg(feature = "timing")]
use crate::timing::Timing;
use crate::{
	gini::{majority_label, mean},
	partition::rearrange_examples_index,
	split::{choose_best_split_for_examples, Split},
	BranchNode, Dataset, ExecutionMode, LeafNode, Node, Task, TrainOptions, Tree,
};
use ndarray::prelude::*;

/**
Train a tree.

Starting from a single node holding every example, each node is split by the best split found by [`choose_best_split`](fn.choose_best_split.html) and its two children are trained recursively with one less level of depth. A node becomes a leaf when the depth budget is used up, when all of its labels are equal, or when no split sends examples to both sides.

Each node owns a slice of the examples index. Splitting a node rearranges its slice so that the left child's examples come first, then hands the two halves to the children. In `ExecutionMode::Parallel` the children are trained with `rayon::join`, and since the halves are disjoint, the two subtrees never touch the same data.
*/
pub fn train(dataset: &Dataset, options: &TrainOptions) -> Tree {
	#[cfg(feature = "timing")]
	let timing = Timing::default();
	let context = TrainContext {
		features: dataset.features(),
		labels: dataset.labels(),
		options,
		#[cfg(feature = "timing")]
		timing: &timing,
	};
	let mut examples_index: Vec<usize> = (0..dataset.n_rows()).collect();
	let root = train_node(&context, &mut examples_index, options.max_depth);
	let mut nodes = Vec::new();
	context.measure(Phase::Flatten, || flatten(root, &mut nodes));
	let tree = Tree {
		n_features: dataset.n_features(),
		nodes,
	};
	log::debug!(
		"trained a tree with {} nodes, {} leaves and depth {}",
		tree.nodes.len(),
		tree.n_leaves(),
		tree.depth(),
	);
	#[cfg(feature = "timing")]
	log::debug!("{:?}", timing);
	tree
}

/// While training, each subtree is an owned `TrainNode`, so the two subtrees of a branch can be built on different threads. The finished subtree is flattened into the `Vec<Node>` of a `Tree`.
enum TrainNode {
	Branch {
		split: Split,
		n_examples: usize,
		left: Box<TrainNode>,
		right: Box<TrainNode>,
	},
	Leaf(LeafNode),
}

struct TrainContext<'a> {
	features: ArrayView2<'a, f32>,
	labels: ArrayView1<'a, f32>,
	options: &'a TrainOptions,
	#[cfg(feature = "timing")]
	timing: &'a Timing,
}

#[derive(Clone, Copy)]
enum Phase {
	ChooseBestSplit,
	RearrangeExamplesIndex,
	Flatten,
}

impl<'a> TrainContext<'a> {
	#[cfg(feature = "timing")]
	fn measure<T>(&self, phase: Phase, f: impl FnOnce() -> T) -> T {
		let duration = match phase {
			Phase::ChooseBestSplit => &self.timing.choose_best_split,
			Phase::RearrangeExamplesIndex => &self.timing.rearrange_examples_index,
			Phase::Flatten => &self.timing.flatten,
		};
		duration.measure(f)
	}

	#[cfg(not(feature = "timing"))]
	fn measure<T>(&self, _phase: Phase, f: impl FnOnce() -> T) -> T {
		f()
	}
}

fn train_node(
	context: &TrainContext,
	examples_index: &mut [usize],
	depth_remaining: usize,
) -> TrainNode {
	let options = context.options;
	let n_examples = examples_index.len();
	if depth_remaining == 0 || n_examples == 0 || labels_are_pure(context.labels, examples_index) {
		return make_leaf(context, examples_index);
	}
	let candidate = context.measure(Phase::ChooseBestSplit, || {
		choose_best_split_for_examples(
			context.features,
			context.labels,
			examples_index,
			options.execution_mode,
		)
	});
	let split: Split = match candidate {
		Some(candidate) => candidate.into(),
		None => return make_leaf(context, examples_index),
	};
	let n_left = context.measure(Phase::RearrangeExamplesIndex, || {
		rearrange_examples_index(context.features, &split, examples_index)
	});
	if n_left == 0 || n_left == n_examples {
		return make_leaf(context, examples_index);
	}
	let (left_examples_index, right_examples_index) = examples_index.split_at_mut(n_left);
	let fan_out = options.execution_mode == ExecutionMode::Parallel
		&& n_examples >= options.min_examples_to_parallelize;
	let (left, right) = if fan_out {
		rayon::join(
			|| train_node(context, left_examples_index, depth_remaining - 1),
			|| train_node(context, right_examples_index, depth_remaining - 1),
		)
	} else {
		(
			train_node(context, left_examples_index, depth_remaining - 1),
			train_node(context, right_examples_index, depth_remaining - 1),
		)
	};
	TrainNode::Branch {
		split,
		n_examples,
		left: Box::new(left),
		right: Box::new(right),
	}
}

fn labels_are_pure(labels: ArrayView1<f32>, examples_index: &[usize]) -> bool {
	match examples_index.split_first() {
		Some((first, rest)) => rest
			.iter()
			.all(|example_index| labels[*example_index] == labels[*first]),
		None => true,
	}
}

fn make_leaf(context: &TrainContext, examples_index: &[usize]) -> TrainNode {
	let labels = examples_index
		.iter()
		.map(|example_index| context.labels[*example_index]);
	let value = match context.options.task {
		Task::Regression => mean(labels),
		Task::Classification => majority_label(labels).unwrap_or(0.0),
	};
	TrainNode::Leaf(LeafNode {
		value,
		n_examples: examples_index.len(),
	})
}

/// Append `root` and its descendants to `nodes` in pre-order.
fn flatten(root: TrainNode, nodes: &mut Vec<Node>) {
	// Each entry holds a node waiting to be placed and the branch that must point to it.
	let mut stack: Vec<(TrainNode, Option<(usize, Side)>)> = vec![(root, None)];
	while let Some((node, parent)) = stack.pop() {
		let node_index = nodes.len();
		if let Some((parent_index, side)) = parent {
			if let Node::Branch(branch) = &mut nodes[parent_index] {
				match side {
					Side::Left => branch.left_child_index = node_index,
					Side::Right => branch.right_child_index = node_index,
				}
			}
		}
		match node {
			TrainNode::Leaf(leaf) => nodes.push(Node::Leaf(leaf)),
			TrainNode::Branch {
				split,
				n_examples,
				left,
				right,
			} => {
				nodes.push(Node::Branch(BranchNode {
					split,
					left_child_index: 0,
					right_child_index: 0,
					n_examples,
				}));
				// The left child is popped first.
				stack.push((*right, Some((node_index, Side::Right))));
				stack.push((*left, Some((node_index, Side::Left))));
			}
		}
	}
}

#[derive(Clone, Copy)]
enum Side {
	Left,
	Right,
}

#[cfg(test)]
pub(crate) fn random_dataset(
	rng: &mut impl rand::Rng,
	n_rows: usize,
	n_features: usize,
	n_classes: usize,
) -> Dataset {
	use num_traits::ToPrimitive;
	let rows: Vec<Vec<f32>> = (0..n_rows)
		.map(|_| {
			(0..n_features)
				.map(|_| rng.gen_range::<u32, _, _>(0, 10).to_f32().unwrap())
				.collect()
		})
		.collect();
	let labels: Vec<f32> = (0..n_rows)
		.map(|_| rng.gen_range::<usize, _, _>(0, n_classes).to_f32().unwrap())
		.collect();
	Dataset::from_rows(&rows, &labels).unwrap()
}

#[test]
fn test_separable() {
	let dataset = Dataset::from_rows(
		&[vec![1.0, 5.0], vec![2.0, 5.0], vec![8.0, 1.0], vec![9.0, 1.0]],
		&[0.0, 0.0, 1.0, 1.0],
	)
	.unwrap();
	let options = TrainOptions {
		max_depth: 1,
		..Default::default()
	};
	let tree = train(&dataset, &options);
	insta::assert_debug_snapshot!(tree, @r###"
	Tree {
	    n_features: 2,
	    nodes: [
	        Branch(
	            BranchNode {
	                split: Split {
	                    feature_index: 0,
	                    threshold: 2.0,
	                },
	                left_child_index: 1,
	                right_child_index: 2,
	                n_examples: 4,
	            },
	        ),
	        Leaf(
	            LeafNode {
	                value: 0.0,
	                n_examples: 2,
	            },
	        ),
	        Leaf(
	            LeafNode {
	                value: 1.0,
	                n_examples: 2,
	            },
	        ),
	    ],
	}
	"###);
	assert_eq!(tree.predict(arr1(&[1.5, 5.0]).view()), Ok(0.0));
	assert_eq!(tree.predict(arr1(&[8.5, 1.0]).view()), Ok(1.0));
}

#[test]
fn test_single_leaf() {
	let options = TrainOptions {
		max_depth: 10,
		..Default::default()
	};
	// A single row.
	let dataset = Dataset::from_rows(&[vec![1.0, 2.0]], &[3.0]).unwrap();
	let tree = train(&dataset, &options);
	assert_eq!(
		tree.nodes,
		vec![Node::Leaf(LeafNode {
			value: 3.0,
			n_examples: 1
		})]
	);
	// Identical labels.
	let dataset = Dataset::from_rows(
		&[vec![1.0, 2.0], vec![5.0, 1.0], vec![3.0, 3.0]],
		&[1.0, 1.0, 1.0],
	)
	.unwrap();
	let tree = train(&dataset, &options);
	assert_eq!(
		tree.nodes,
		vec![Node::Leaf(LeafNode {
			value: 1.0,
			n_examples: 3
		})]
	);
	// No depth budget.
	let dataset = Dataset::from_rows(
		&[vec![1.0], vec![2.0], vec![3.0]],
		&[0.0, 1.0, 1.0],
	)
	.unwrap();
	let options = TrainOptions {
		max_depth: 0,
		task: Task::Regression,
		..Default::default()
	};
	let tree = train(&dataset, &options);
	assert_eq!(tree.nodes.len(), 1);
	assert!((tree.predict(dataset.row(0)).unwrap() - 2.0 / 3.0).abs() < 1e-6);
}

#[test]
fn test_no_valid_split() {
	// Every row has the same features, so no split sends examples to both sides.
	let dataset = Dataset::from_rows(
		&[vec![1.0, 1.0], vec![1.0, 1.0], vec![1.0, 1.0]],
		&[0.0, 1.0, 1.0],
	)
	.unwrap();
	let tree = train(&dataset, &TrainOptions::default());
	assert_eq!(
		tree.nodes,
		vec![Node::Leaf(LeafNode {
			value: 1.0,
			n_examples: 3
		})]
	);
}

#[test]
fn test_depth_never_exceeds_max_depth() {
	use rand::SeedableRng;
	let mut rng = rand_xoshiro::Xoshiro256Plus::seed_from_u64(3);
	for max_depth in 0..6 {
		let dataset = random_dataset(&mut rng, 80, 3, 3);
		let options = TrainOptions {
			max_depth,
			..Default::default()
		};
		let tree = train(&dataset, &options);
		assert!(tree.depth() <= max_depth);
	}
}

#[test]
fn test_sequential_and_parallel_trees_are_identical() {
	use rand::SeedableRng;
	let mut rng = rand_xoshiro::Xoshiro256Plus::seed_from_u64(11);
	for &task in &[Task::Classification, Task::Regression] {
		for _ in 0..10 {
			let dataset = random_dataset(&mut rng, 120, 4, 3);
			let sequential = TrainOptions {
				max_depth: 8,
				task,
				execution_mode: ExecutionMode::Sequential,
				..Default::default()
			};
			let parallel = TrainOptions {
				execution_mode: ExecutionMode::Parallel,
				min_examples_to_parallelize: 0,
				..sequential.clone()
			};
			assert_eq!(train(&dataset, &sequential), train(&dataset, &parallel));
		}
	}
}

#[test]
fn test_leaves_summarize_the_examples_that_reach_them() {
	use rand::SeedableRng;
	use std::collections::BTreeMap;
	let mut rng = rand_xoshiro::Xoshiro256Plus::seed_from_u64(5);
	for &task in &[Task::Classification, Task::Regression] {
		let dataset = random_dataset(&mut rng, 200, 3, 2);
		let options = TrainOptions {
			max_depth: 4,
			task,
			execution_mode: ExecutionMode::Parallel,
			min_examples_to_parallelize: 16,
		};
		let tree = train(&dataset, &options);
		// Route every training example to its leaf.
		let mut labels_by_leaf: BTreeMap<usize, Vec<f32>> = BTreeMap::new();
		for (row, label) in dataset.features().axis_iter(Axis(0)).zip(dataset.labels()) {
			labels_by_leaf
				.entry(tree.leaf_index(row).unwrap())
				.or_default()
				.push(*label);
		}
		for (leaf_index, labels) in labels_by_leaf {
			let leaf = tree.nodes[leaf_index].as_leaf().unwrap();
			assert_eq!(leaf.n_examples, labels.len());
			let expected = match task {
				Task::Regression => mean(labels),
				Task::Classification => majority_label(labels).unwrap(),
			};
			assert_eq!(leaf.value, expected);
		}
	}
}

#[test]
fn test_predict_is_idempotent() {
	use rand::SeedableRng;
	let mut rng = rand_xoshiro::Xoshiro256Plus::seed_from_u64(8);
	let dataset = random_dataset(&mut rng, 50, 2, 2);
	let tree = train(&dataset, &TrainOptions::default());
	for row in dataset.features().axis_iter(Axis(0)) {
		assert_eq!(tree.predict(row), tree.predict(row));
	}
	let predictions = tree.predict_dataset(dataset.features()).unwrap();
	assert_eq!(predictions, tree.predict_dataset(dataset.features()).unwrap());
	assert_eq!(
		tree.predict_dataset(arr2(&[[1.0, 2.0, 3.0]]).view()),
		Err(crate::Error::FeatureCountMismatch {
			expected: 2,
			actual: 3,
		})
	);
}

#[test]
fn test_flatten_a_long_chain() {
	// Every branch has a leaf on the left and the rest of the chain on the right.
	let n_branches = 100_000;
	let mut node = TrainNode::Leaf(LeafNode {
		value: 1.0,
		n_examples: 1,
	});
	for i in (0..n_branches).rev() {
		node = TrainNode::Branch {
			split: Split {
				feature_index: 0,
				threshold: i as f32,
			},
			n_examples: n_branches - i + 1,
			left: Box::new(TrainNode::Leaf(LeafNode {
				value: 0.0,
				n_examples: 1,
			})),
			right: Box::new(node),
		};
	}
	let mut nodes = Vec::new();
	flatten(node, &mut nodes);
	assert_eq!(nodes.len(), 2 * n_branches + 1);
	let first = nodes[0].as_branch().unwrap();
	assert_eq!(first.left_child_index, 1);
	assert_eq!(first.right_child_index, 2);
	let last = nodes[2 * (n_branches - 1)].as_branch().unwrap();
	assert_eq!(last.split.threshold, (n_branches - 1) as f32);
	assert_eq!(last.right_child_index, 2 * n_branches);
	let tree = Tree {
		n_features: 1,
		nodes,
	};
	assert_eq!(tree.depth(), n_branches);
	assert_eq!(tree.predict(arr1(&[-1.0]).view()), Ok(0.0));
	assert_eq!(tree.predict(arr1(&[1e9]).view()), Ok(1.0));
}
