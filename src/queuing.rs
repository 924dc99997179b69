use crate::activity_validation::ValidationError;
use crate::error::{AnalysisError, AnalysisResult};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Number of states reported when the caller does not ask for more.
pub const DEFAULT_MAX_STATES: usize = 15;

/// M/M/s system: Poisson arrivals, exponential service, `servers` parallel servers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueuingModel {
    #[serde(alias = "lambda")]
    pub arrival_rate: f64,
    /// Rate of a single server.
    #[serde(alias = "mu")]
    pub service_rate: f64,
    #[serde(alias = "s", default = "default_servers")]
    pub servers: u32,
}

fn default_servers() -> u32 {
    1
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueuingMetrics {
    pub rho: f64,
    pub l: f64,
    pub lq: f64,
    pub w: f64,
    pub wq: f64,
    pub p0: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StateProbability {
    pub n: usize,
    pub probability: f64,
    /// Running total, capped at 1.
    pub cumulative: f64,
}

impl QueuingModel {
    pub fn new(arrival_rate: f64, service_rate: f64, servers: u32) -> AnalysisResult<Self> {
        let model = Self {
            arrival_rate,
            service_rate,
            servers,
        };
        model.validate()?;
        Ok(model)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        for (name, value) in [
            ("arrival rate", self.arrival_rate),
            ("service rate", self.service_rate),
        ] {
            if !value.is_finite() {
                return Err(ValidationError::NonFiniteParameter { name });
            }
            if value <= 0.0 {
                return Err(ValidationError::NonPositiveRate { name, value });
            }
        }
        if self.servers == 0 {
            return Err(ValidationError::NoServers);
        }
        Ok(())
    }

    /// Offered load per server, λ / (s·μ).
    pub fn utilization(&self) -> f64 {
        self.arrival_rate / (f64::from(self.servers) * self.service_rate)
    }

    /// Offered load in erlangs, λ / μ.
    pub fn offered_load(&self) -> f64 {
        self.arrival_rate / self.service_rate
    }

    fn stable_utilization(&self) -> AnalysisResult<f64> {
        self.validate()?;
        let rho = self.utilization();
        if rho >= 1.0 {
            return Err(AnalysisError::Instability { utilization: rho });
        }
        Ok(rho)
    }

    /// Steady-state metrics via the Erlang-C normalisation.
    pub fn solve(&self) -> AnalysisResult<QueuingMetrics> {
        let rho = self.stable_utilization()?;

        let normalizer = ErlangNormalizer::compute(self.offered_load(), self.servers, rho);
        let p0 = non_negative((-normalizer.log_total).exp());
        let waiting = non_negative((normalizer.log_queued - normalizer.log_total).exp());
        let lq = non_negative(waiting * rho / (1.0 - rho));
        let l = non_negative(lq + self.offered_load());
        let wq = non_negative(lq / self.arrival_rate);
        let w = non_negative(wq + 1.0 / self.service_rate);

        info!(servers = self.servers, rho, l, lq, w, wq, p0, "queue solved");
        Ok(QueuingMetrics {
            rho,
            l,
            lq,
            w,
            wq,
            p0,
        })
    }

    /// P(n) for n = 0..=max_n. Fails like `solve` on an unstable model.
    pub fn probability_distribution(&self, max_n: usize) -> AnalysisResult<Vec<StateProbability>> {
        let rho = self.stable_utilization()?;

        let r = self.offered_load();
        let servers = self.servers as usize;
        let log_total = ErlangNormalizer::compute(r, self.servers, rho).log_total;

        let mut distribution = Vec::with_capacity(max_n + 1);
        let mut cumulative = 0.0;
        let mut log_term = 0.0;
        for n in 0..=max_n {
            if n > servers {
                log_term += rho.ln();
            } else if n > 0 {
                log_term += r.ln() - (n as f64).ln();
            }
            let probability = non_negative((log_term - log_total).exp());
            cumulative += probability;
            distribution.push(StateProbability {
                n,
                probability,
                cumulative: cumulative.min(1.0),
            });
        }
        Ok(distribution)
    }
}

/// Terms this many nats below the running maximum no longer move an f64 sum.
const NEGLIGIBLE_LOG_GAP: f64 = 40.0;

/// Running log-sum-exp, so r^n/n! never has to be held as a raw f64.
#[derive(Debug, Clone, Copy)]
struct LogSum {
    max: f64,
    scaled: f64,
}

impl LogSum {
    fn new() -> Self {
        Self {
            max: f64::NEG_INFINITY,
            scaled: 0.0,
        }
    }

    fn add(&mut self, log_value: f64) {
        if log_value > self.max {
            self.scaled = self.scaled * (self.max - log_value).exp() + 1.0;
            self.max = log_value;
        } else {
            self.scaled += (log_value - self.max).exp();
        }
    }

    fn ln(&self) -> f64 {
        self.max + self.scaled.ln()
    }
}

/// ln of the Erlang-C denominator Σ_{n<s} r^n/n! + r^s/(s!(1-ρ)), and of its queued part.
#[derive(Debug, Clone, Copy)]
struct ErlangNormalizer {
    log_total: f64,
    log_queued: f64,
}

impl ErlangNormalizer {
    fn compute(r: f64, servers: u32, rho: f64) -> Self {
        let mut sum = LogSum::new();
        let mut log_term = 0.0;
        for n in 0..u64::from(servers) {
            if n > 0 {
                log_term += r.ln() - (n as f64).ln();
            }
            sum.add(log_term);

            // Past the mode every later term, queued ones included, shrinks by at
            // least r/(n+1), so the rest is bounded by term·(n+1)/(n+1-r).
            let next = (n + 1) as f64;
            if next > r && log_term + (next / (next - r)).ln() < sum.max - NEGLIGIBLE_LOG_GAP {
                return Self {
                    log_total: sum.ln(),
                    log_queued: f64::NEG_INFINITY,
                };
            }
        }

        let log_at_servers = log_term + r.ln() - f64::from(servers).ln();
        let log_queued = log_at_servers - (1.0 - rho).ln();
        sum.add(log_queued);
        Self {
            log_total: sum.ln(),
            log_queued,
        }
    }
}

fn non_negative(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}

/// Closed-form M/M/1 metrics.
pub fn solve_mm1(arrival_rate: f64, service_rate: f64) -> AnalysisResult<QueuingMetrics> {
    let model = QueuingModel::new(arrival_rate, service_rate, 1)?;
    let rho = model.utilization();
    if rho >= 1.0 {
        return Err(AnalysisError::Instability { utilization: rho });
    }
    let spare = service_rate - arrival_rate;
    Ok(QueuingMetrics {
        rho,
        l: arrival_rate / spare,
        lq: arrival_rate * arrival_rate / (service_rate * spare),
        w: 1.0 / spare,
        wq: arrival_rate / (service_rate * spare),
        p0: 1.0 - rho,
    })
}
