//! Display metadata and default inputs for each algorithm.

use crate::model::Algorithm;

pub const DEFAULT_ARRAY_INPUT: &str = "64, 34, 25, 12, 22, 11, 90";
pub const DEFAULT_JOB_INPUT: &str = "100,2;19,1;27,2;25,1;15,3";
pub const DEFAULT_KNAPSACK_INPUT: &str = "60,10;100,20;120,30";
pub const DEFAULT_CAPACITY: &str = "50";

/// Narration shown whenever the controller is idle.
pub const IDLE_NARRATION: &str = "Enter data and click Start to begin";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlgorithmInfo {
    pub name: &'static str,
    pub description: &'static str,
}

pub fn info(algorithm: Algorithm) -> AlgorithmInfo {
    match algorithm {
        Algorithm::Bubble => AlgorithmInfo {
            name: "Bubble Sort",
            description: "Repeatedly steps through the list, compares adjacent elements and swaps them if they're in wrong order. Time: O(n²), Space: O(1)",
        },
        Algorithm::Linear => AlgorithmInfo {
            name: "Linear Search",
            description: "Sequentially checks each element until target is found or list ends. Time: O(n), Space: O(1)",
        },
        Algorithm::JobSequencing => AlgorithmInfo {
            name: "Job Sequencing Problem",
            description: "Greedy algorithm to maximize profit by scheduling jobs with deadlines. Sorts jobs by profit and assigns to latest possible slot. Time: O(n²), Space: O(n)",
        },
        Algorithm::Knapsack => AlgorithmInfo {
            name: "Fractional Knapsack Problem",
            description: "Greedy algorithm to maximize value in a knapsack. Items with the highest value-to-weight ratio are selected first. Time: O(n log n), Space: O(n)",
        },
    }
}

pub fn default_input(algorithm: Algorithm) -> &'static str {
    match algorithm {
        Algorithm::Bubble | Algorithm::Linear => DEFAULT_ARRAY_INPUT,
        Algorithm::JobSequencing => DEFAULT_JOB_INPUT,
        Algorithm::Knapsack => DEFAULT_KNAPSACK_INPUT,
    }
}
