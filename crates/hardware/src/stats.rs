//! Simulation statistics collection and reporting.
//!
//! This module tracks flow metrics for the pipeline simulator. It provides:
//! 1. **Ticks and throughput:** Total ticks, retired results, and results per tick.
//! 2. **Admission:** Offers, acceptances, denials, and peak in-flight count.
//! 3. **Drain:** Emitted and retired results, empty polls, and peak buffer occupancy.

use std::time::Instant;

/// Simulation statistics structure tracking all flow metrics.
#[derive(Clone, Debug)]
pub struct SimStats {
    start_time: Instant,
    /// Total ticks committed.
    pub ticks: u64,

    /// Offers made by the producer.
    pub offers: u64,
    /// Offers accepted.
    pub admitted: u64,
    /// Offers denied by flow control.
    pub denied: u64,
    /// Committed ticks on which nothing was admitted, whether or not the
    /// producer offered. Compare with `denied` to separate back-pressure
    /// from an idle producer.
    pub idle_admission_ticks: u64,

    /// Results that left the final stage.
    pub emitted: u64,
    /// Results handed to the consumer.
    pub retired: u64,
    /// Consumer polls made while no result was available.
    pub empty_polls: u64,

    /// Highest in-flight count observed at a tick boundary.
    pub peak_in_flight: usize,
    /// Highest drain buffer occupancy observed at a tick boundary.
    pub peak_buffered: usize,
}

impl Default for SimStats {
    /// Returns the default value.
    fn default() -> Self {
        Self {
            start_time: Instant::now(),
            ticks: 0,
            offers: 0,
            admitted: 0,
            denied: 0,
            idle_admission_ticks: 0,
            emitted: 0,
            retired: 0,
            empty_polls: 0,
            peak_in_flight: 0,
            peak_buffered: 0,
        }
    }
}

/// Section names for selective stats output.
///
/// Valid section identifiers: `"summary"`, `"admission"`, `"drain"`.
/// Pass an empty slice to `print_sections` to print all sections.
pub const STATS_SECTIONS: &[&str] = &["summary", "admission", "drain"];

impl SimStats {
    /// Retired results per committed tick.
    pub fn throughput(&self) -> f64 {
        if self.ticks == 0 {
            return 0.0;
        }
        self.retired as f64 / self.ticks as f64
    }

    /// Fraction of offers that were accepted.
    pub fn acceptance_rate(&self) -> f64 {
        if self.offers == 0 {
            return 0.0;
        }
        self.admitted as f64 / self.offers as f64
    }

    /// Renders the requested sections as text.
    ///
    /// Each element of `sections` should be one of [`STATS_SECTIONS`]; pass an
    /// empty slice for all of them. Unknown names are ignored.
    pub fn report(&self, sections: &[String]) -> String {
        let want = |s: &str| sections.is_empty() || sections.iter().any(|x| x == s);
        let seconds = self.start_time.elapsed().as_secs_f64();
        let mut out = String::new();

        out.push_str("==========================================================\n");
        out.push_str("PIPELINE SIMULATION STATISTICS\n");
        out.push_str("==========================================================\n");
        if want("summary") {
            let khz = if seconds > 0.0 {
                (self.ticks as f64 / seconds) / 1000.0
            } else {
                0.0
            };
            out.push_str(&format!("host_seconds             {seconds:.4} s\n"));
            out.push_str(&format!("sim_ticks                {}\n", self.ticks));
            out.push_str(&format!("sim_freq                 {khz:.2} kHz\n"));
            out.push_str(&format!("sim_results              {}\n", self.retired));
            out.push_str(&format!(
                "sim_throughput           {:.4} results/tick\n",
                self.throughput()
            ));
            out.push_str("----------------------------------------------------------\n");
        }
        if want("admission") {
            let ticks = self.ticks.max(1) as f64;
            out.push_str("ADMISSION\n");
            out.push_str(&format!("  offers                 {}\n", self.offers));
            out.push_str(&format!(
                "  admitted               {} ({:.2}%)\n",
                self.admitted,
                self.acceptance_rate() * 100.0
            ));
            out.push_str(&format!("  denied                 {}\n", self.denied));
            out.push_str(&format!(
                "  idle_admission_ticks   {} ({:.2}%)\n",
                self.idle_admission_ticks,
                (self.idle_admission_ticks as f64 / ticks) * 100.0
            ));
            out.push_str(&format!("  peak_in_flight         {}\n", self.peak_in_flight));
            out.push_str("----------------------------------------------------------\n");
        }
        if want("drain") {
            out.push_str("DRAIN\n");
            out.push_str(&format!("  emitted                {}\n", self.emitted));
            out.push_str(&format!("  retired                {}\n", self.retired));
            out.push_str(&format!("  empty_polls            {}\n", self.empty_polls));
            out.push_str(&format!("  peak_buffered          {}\n", self.peak_buffered));
        }
        out.push_str("==========================================================\n");
        out
    }

    /// Prints only the requested statistics sections to stdout.
    pub fn print_sections(&self, sections: &[String]) {
        print!("{}", self.report(sections));
    }

    /// Prints all statistics sections to stdout.
    ///
    /// Equivalent to `print_sections(&[])`.
    pub fn print(&self) {
        self.print_sections(&[]);
    }
}
