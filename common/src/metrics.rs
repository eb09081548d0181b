//! Passive counters describing how much work the deduction loop does.
//!
//! The solver records into a [`Metrics`] value as it runs; nothing here feeds
//! back into deduction. Averages and ratios are derived on demand and are 0.0
//! while their denominator has no samples.

use std::fmt;

#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Metrics {
    knowledge_base_total_size: u64,
    knowledge_base_max_size: u64,
    knowledge_base_count: u64,
    inferences_total: u64,
    inferences_max: u64,
    subset_comparisons_total: u64,
    subset_comparisons_max: u64,
    subset_comparisons_count: u64,
    iterations_total: u64,
    iterations_max: u64,
    iterations_count: u64,
    duplicates_total: u64,
}

/// A named snapshot of [`Metrics`], ready for display or serialisation.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct MetricsSummary {
    /// Mean store size over every propagation pass.
    pub knowledge_base_avg_size: f64,
    pub knowledge_base_max_size: u64,
    /// Statements returned by strategies, before the solver filters them.
    pub inferences_total: u64,
    /// Most statements returned by a single strategy call.
    pub inferences_max: u64,
    /// Mean pairs examined per strategy call.
    pub subset_comparisons_avg: f64,
    pub subset_comparisons_max: u64,
    pub subset_comparisons_total: u64,
    /// `inferences_total / subset_comparisons_total`.
    pub inference_to_comparison_ratio: f64,
    /// Mean propagation passes per `propagate` call.
    pub iterations_avg: f64,
    pub iterations_max: u64,
    pub iterations_total: u64,
    /// Statements dropped by purges as exact duplicates.
    pub duplicates_total: u64,
}

fn ratio(numerator: u64, denominator: u64) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// One sample of the store size. The solver takes one after the purge of
    /// every propagation pass, so the average is per pass, not per observation.
    pub fn record_knowledge_base_size(&mut self, size: usize) {
        let size = size as u64;
        self.knowledge_base_total_size += size;
        self.knowledge_base_max_size = self.knowledge_base_max_size.max(size);
        self.knowledge_base_count += 1;
    }

    /// One strategy invocation: how many pairs it examined and how many statements it produced.
    pub fn record_search(&mut self, comparisons: u64, inferences: usize) {
        let inferences = inferences as u64;
        self.inferences_total += inferences;
        self.inferences_max = self.inferences_max.max(inferences);

        self.subset_comparisons_total += comparisons;
        self.subset_comparisons_max = self.subset_comparisons_max.max(comparisons);
        self.subset_comparisons_count += 1;
    }

    /// Passes the propagation loop needed for one call.
    pub fn record_iterations(&mut self, iterations: usize) {
        let iterations = iterations as u64;
        self.iterations_total += iterations;
        self.iterations_max = self.iterations_max.max(iterations);
        self.iterations_count += 1;
    }

    pub fn record_duplicates(&mut self, duplicates: usize) {
        self.duplicates_total += duplicates as u64;
    }

    pub fn average_knowledge_base_size(&self) -> f64 {
        ratio(self.knowledge_base_total_size, self.knowledge_base_count)
    }

    pub fn average_comparisons(&self) -> f64 {
        ratio(self.subset_comparisons_total, self.subset_comparisons_count)
    }

    pub fn average_iterations(&self) -> f64 {
        ratio(self.iterations_total, self.iterations_count)
    }

    pub fn inference_to_comparison_ratio(&self) -> f64 {
        ratio(self.inferences_total, self.subset_comparisons_total)
    }

    /// Number of store size samples behind [`Metrics::average_knowledge_base_size`].
    pub fn knowledge_base_samples(&self) -> u64 {
        self.knowledge_base_count
    }

    pub fn inferences_total(&self) -> u64 {
        self.inferences_total
    }

    pub fn subset_comparisons_total(&self) -> u64 {
        self.subset_comparisons_total
    }

    pub fn searches(&self) -> u64 {
        self.subset_comparisons_count
    }

    pub fn duplicates_total(&self) -> u64 {
        self.duplicates_total
    }

    pub fn summary(&self) -> MetricsSummary {
        MetricsSummary {
            knowledge_base_avg_size: self.average_knowledge_base_size(),
            knowledge_base_max_size: self.knowledge_base_max_size,
            inferences_total: self.inferences_total,
            inferences_max: self.inferences_max,
            subset_comparisons_avg: self.average_comparisons(),
            subset_comparisons_max: self.subset_comparisons_max,
            subset_comparisons_total: self.subset_comparisons_total,
            inference_to_comparison_ratio: self.inference_to_comparison_ratio(),
            iterations_avg: self.average_iterations(),
            iterations_max: self.iterations_max,
            iterations_total: self.iterations_total,
            duplicates_total: self.duplicates_total,
        }
    }

    /// Folds `other` into `self`, as if every sample of `other` had been recorded here.
    pub fn merge(&mut self, other: &Metrics) {
        self.knowledge_base_total_size += other.knowledge_base_total_size;
        self.knowledge_base_max_size = self.knowledge_base_max_size.max(other.knowledge_base_max_size);
        self.knowledge_base_count += other.knowledge_base_count;
        self.inferences_total += other.inferences_total;
        self.inferences_max = self.inferences_max.max(other.inferences_max);
        self.subset_comparisons_total += other.subset_comparisons_total;
        self.subset_comparisons_max = self.subset_comparisons_max.max(other.subset_comparisons_max);
        self.subset_comparisons_count += other.subset_comparisons_count;
        self.iterations_total += other.iterations_total;
        self.iterations_max = self.iterations_max.max(other.iterations_max);
        self.iterations_count += other.iterations_count;
        self.duplicates_total += other.duplicates_total;
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

impl fmt::Display for MetricsSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "knowledge base avg size:        {:.2}", self.knowledge_base_avg_size)?;
        writeln!(f, "knowledge base max size:        {}", self.knowledge_base_max_size)?;
        writeln!(f, "inferences total:               {}", self.inferences_total)?;
        writeln!(f, "inferences max:                 {}", self.inferences_max)?;
        writeln!(f, "subset comparisons avg:         {:.2}", self.subset_comparisons_avg)?;
        writeln!(f, "subset comparisons max:         {}", self.subset_comparisons_max)?;
        writeln!(f, "subset comparisons total:       {}", self.subset_comparisons_total)?;
        writeln!(f, "inference to comparison ratio:  {:.4}", self.inference_to_comparison_ratio)?;
        writeln!(f, "iterations avg:                 {:.2}", self.iterations_avg)?;
        writeln!(f, "iterations max:                 {}", self.iterations_max)?;
        writeln!(f, "iterations total:               {}", self.iterations_total)?;
        write!(f, "duplicate statements removed:   {}", self.duplicates_total)
    }
}
