/*!
This crate trains decision trees and random forests over number features, either on a single thread or in parallel on the rayon thread pool.

A tree is grown by repeatedly choosing the split with the lowest weighted gini impurity, see [`choose_best_split`](fn.choose_best_split.html). A forest trains many trees on bootstrap samples of the data and predicts by majority vote, see [`Forest`](struct.Forest.html). Both execution modes produce the same trees.

```
use arbor_tree::{Dataset, TrainOptions};

let dataset = Dataset::from_rows(
	&[vec![1.0, 5.0], vec![2.0, 5.0], vec![8.0, 1.0], vec![9.0, 1.0]],
	&[0.0, 0.0, 1.0, 1.0],
)
.unwrap();
let tree = arbor_tree::train(&dataset, &TrainOptions::default());
assert_eq!(tree.predict(dataset.row(3)).unwrap(), 1.0);
```
*/

#![allow(clippy::tabs_in_doc_comments)]

mod bootstrap;
mod dataset;
mod error;
mod forest;
mod gini;
mod partition;
mod split;
#[cfg(feature = "timing")]
mod timing;
mod train;

pub use self::bootstrap::{bootstrap_examples_index, bootstrap_sample};
pub use self::dataset::Dataset;
pub use self::error::Error;
pub use self::forest::{Forest, ForestOptions, TrainProgress};
pub use self::gini::{gini_impurity, gini_impurity_from_counts, majority_label, mean, ClassCounts};
pub use self::partition::rearrange_examples_index;
pub use self::split::{choose_best_split, Split, SplitCandidate};
pub use self::train::train;

use ndarray::prelude::*;

/// The `Task` determines the value stored in each leaf.
#[derive(Clone, Copy, Debug, PartialEq, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Task {
	/// Leaves hold the mean of the labels of the training examples that reach them.
	Regression,
	/// Leaves hold the most frequent label of the training examples that reach them.
	Classification,
}

/// Should training run on the calling thread or on the rayon thread pool?
#[derive(Clone, Copy, Debug, PartialEq, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionMode {
	Sequential,
	Parallel,
}

/// These are the options passed to [`train`](fn.train.html).
#[derive(Clone, Debug)]
pub struct TrainOptions {
	/// The depth of a tree will never exceed this value. A depth of 0 produces a single leaf. The trainer recurses once per level, so this also bounds its stack depth.
	pub max_depth: usize,
	/// This controls whether leaves hold the mean or the majority label.
	pub task: Task,
	/// In `ExecutionMode::Parallel` each split search runs one task per feature, and the left and right subtrees of a node are trained concurrently.
	pub execution_mode: ExecutionMode,
	/// Nodes with fewer training examples than this train their subtrees one after the other even in `ExecutionMode::Parallel`, because below this size spawning tasks costs more than it saves.
	pub min_examples_to_parallelize: usize,
}

impl Default for TrainOptions {
	fn default() -> Self {
		Self {
			max_depth: 3,
			task: Task::Classification,
			execution_mode: ExecutionMode::Sequential,
			min_examples_to_parallelize: 1024,
		}
	}
}

/// Trees are stored as a `Vec` of `Node`s. The root is at index 0 and each branch holds the indexes of its two children.
#[derive(Clone, Debug, PartialEq)]
pub struct Tree {
	/// The number of features in the dataset this tree was trained on.
	pub n_features: usize,
	pub nodes: Vec<Node>,
}

impl Tree {
	/// Make a prediction for a single example. The row must have `n_features` values.
	pub fn predict(&self, row: ArrayView1<f32>) -> Result<f32, Error> {
		self.check_row(row)?;
		Ok(self.predict_unchecked(row))
	}

	/// Make a prediction for every row of `features`.
	pub fn predict_dataset(&self, features: ArrayView2<f32>) -> Result<Array1<f32>, Error> {
		let expected = self.n_features;
		if features.ncols() != expected {
			return Err(Error::FeatureCountMismatch {
				expected,
				actual: features.ncols(),
			});
		}
		Ok(features
			.axis_iter(Axis(0))
			.map(|row| self.predict_unchecked(row))
			.collect())
	}

	pub(crate) fn check_row(&self, row: ArrayView1<f32>) -> Result<(), Error> {
		if row.len() != self.n_features {
			return Err(Error::FeatureCountMismatch {
				expected: self.n_features,
				actual: row.len(),
			});
		}
		Ok(())
	}

	/// The caller must have checked the length of `row`.
	pub(crate) fn predict_unchecked(&self, row: ArrayView1<f32>) -> f32 {
		match &self.nodes[self.leaf_index_unchecked(row)] {
			Node::Leaf(LeafNode { value, .. }) => *value,
			Node::Branch(_) => unreachable!(),
		}
	}

	/// Return the index of the leaf that `row` is sent to.
	pub fn leaf_index(&self, row: ArrayView1<f32>) -> Result<usize, Error> {
		self.check_row(row)?;
		Ok(self.leaf_index_unchecked(row))
	}

	fn leaf_index_unchecked(&self, row: ArrayView1<f32>) -> usize {
		let mut node_index = 0;
		while let Node::Branch(BranchNode {
			split,
			left_child_index,
			right_child_index,
			..
		}) = &self.nodes[node_index]
		{
			node_index = if split.goes_left(row) {
				*left_child_index
			} else {
				*right_child_index
			};
		}
		node_index
	}

	/// The number of edges on the longest path from the root to a leaf.
	pub fn depth(&self) -> usize {
		let mut max_depth: usize = 0;
		let mut stack: Vec<(usize, usize)> = vec![(0, 0)];
		while let Some((node_index, depth)) = stack.pop() {
			match &self.nodes[node_index] {
				Node::Leaf(_) => max_depth = max_depth.max(depth),
				Node::Branch(branch) => {
					stack.push((branch.left_child_index, depth + 1));
					stack.push((branch.right_child_index, depth + 1));
				}
			}
		}
		max_depth
	}

	pub fn n_leaves(&self) -> usize {
		self.nodes.iter().filter(|node| node.as_leaf().is_some()).count()
	}
}

/// A node is either a branch or a leaf.
#[derive(Clone, Debug, PartialEq)]
pub enum Node {
	Branch(BranchNode),
	Leaf(LeafNode),
}

impl Node {
	pub fn as_branch(&self) -> Option<&BranchNode> {
		match self {
			Node::Branch(branch) => Some(branch),
			Node::Leaf(_) => None,
		}
	}

	pub fn as_leaf(&self) -> Option<&LeafNode> {
		match self {
			Node::Leaf(leaf) => Some(leaf),
			Node::Branch(_) => None,
		}
	}

	/// The number of training examples that reached this node.
	pub fn n_examples(&self) -> usize {
		match self {
			Node::Branch(branch) => branch.n_examples,
			Node::Leaf(leaf) => leaf.n_examples,
		}
	}
}

/// A `BranchNode` is a branch in a tree.
#[derive(Clone, Debug, PartialEq)]
pub struct BranchNode {
	/// This determines whether an example is sent to the left or right child.
	pub split: Split,
	/// This is the index in the tree's node vector for this node's left child.
	pub left_child_index: usize,
	/// This is the index in the tree's node vector for this node's right child.
	pub right_child_index: usize,
	pub n_examples: usize,
}

/// The leaves in a tree hold the values to output for examples that get sent to them.
#[derive(Clone, Debug, PartialEq)]
pub struct LeafNode {
	pub value: f32,
	pub n_examples: usize,
}

#[test]
fn test_predict_checks_the_row_length() {
	let dataset = Dataset::from_rows(
		&[vec![1.0, 5.0], vec![2.0, 5.0], vec![8.0, 1.0], vec![9.0, 1.0]],
		&[0.0, 0.0, 1.0, 1.0],
	)
	.unwrap();
	let tree = train(&dataset, &TrainOptions::default());
	assert_eq!(tree.predict(arr1(&[8.5, 1.0]).view()), Ok(1.0));
	assert_eq!(
		tree.predict(arr1(&[8.5]).view()),
		Err(Error::FeatureCountMismatch {
			expected: 2,
			actual: 1,
		})
	);
	assert_eq!(
		tree.predict(arr1(&[8.5, 1.0, 100.0]).view()),
		Err(Error::FeatureCountMismatch {
			expected: 2,
			actual: 3,
		})
	);
	assert_eq!(
		tree.leaf_index(arr1(&[8.5]).view()),
		Err(Error::FeatureCountMismatch {
			expected: 2,
			actual: 1,
		})
	);
}

#[test]
fn test_depth_of_a_long_chain() {
	// Each branch has a leaf on the left and the rest of the chain on the right.
	let n_branches = 100_000;
	let mut nodes = Vec::with_capacity(2 * n_branches + 1);
	for i in 0..n_branches {
		nodes.push(Node::Branch(BranchNode {
			split: Split {
				feature_index: 0,
				threshold: i as f32,
			},
			left_child_index: 2 * i + 1,
			right_child_index: 2 * i + 2,
			n_examples: n_branches - i + 1,
		}));
		nodes.push(Node::Leaf(LeafNode {
			value: 0.0,
			n_examples: 1,
		}));
	}
	nodes.push(Node::Leaf(LeafNode {
		value: 1.0,
		n_examples: 1,
	}));
	let tree = Tree {
		n_features: 1,
		nodes,
	};
	assert_eq!(tree.depth(), n_branches);
	assert_eq!(tree.n_leaves(), n_branches + 1);
	assert_eq!(tree.predict(arr1(&[1e9]).view()), Ok(1.0));
	assert_eq!(tree.leaf_index(arr1(&[1e9]).view()), Ok(2 * n_branches));
}
