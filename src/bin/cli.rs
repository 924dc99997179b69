use ops_analytics::table::{
    activities_frame, crash_steps_frame, critical_rows, payoff_frame, queue_distribution_frame,
    regret_frame, render_text_table,
};
use ops_analytics::{
    Activity, ActivityDag, AnalysisConfig, CrashingParameters, DecisionFormulas, DurationSelector,
    PertAnalysis, QueuingModel, SheetLayout, analyze_crashing_with_config,
    analyze_pert_with_config, load_activities_from_csv, load_config_from_json,
    load_decision_table_from_json, load_project_from_json, parse_predecessors, schedule,
};
use polars::prelude::{DataFrame, PolarsResult};
use std::io::{self, Write};
use tracing_subscriber::EnvFilter;

struct Session {
    activities: Vec<Activity>,
    parameters: CrashingParameters,
    config: AnalysisConfig,
    pert: Option<PertAnalysis>,
}

impl Session {
    fn new() -> Self {
        Self {
            activities: Vec::new(),
            parameters: CrashingParameters::default(),
            config: AnalysisConfig::default(),
            pert: None,
        }
    }

    fn upsert(&mut self, activity: Activity) -> bool {
        self.pert = None;
        match self.activities.iter_mut().find(|a| a.id == activity.id) {
            Some(existing) => {
                *existing = activity;
                false
            }
            None => {
                self.activities.push(activity);
                true
            }
        }
    }

    fn delete(&mut self, id: &str) -> bool {
        let before = self.activities.len();
        self.activities.retain(|a| a.id != id);
        if self.activities.len() == before {
            return false;
        }
        for activity in &mut self.activities {
            activity.predecessors.retain(|p| p != id);
        }
        self.pert = None;
        true
    }

    fn pert(&mut self) -> Option<&PertAnalysis> {
        if self.pert.is_none() {
            match analyze_pert_with_config(&self.activities, self.config.clone()) {
                Ok(analysis) => self.pert = Some(analysis),
                Err(e) => println!("PERT error: {e}"),
            }
        }
        self.pert.as_ref()
    }
}

fn print_frame(frame: PolarsResult<DataFrame>) {
    match frame {
        Ok(df) => println!("{}", render_text_table(&df)),
        Err(e) => println!("Table error: {e}"),
    }
}

fn parse_number(input: Option<&str>, what: &str) -> Option<f64> {
    match input.map(str::parse::<f64>) {
        Some(Ok(v)) if v.is_finite() => Some(v),
        _ => {
            println!("Invalid {what}");
            None
        }
    }
}

fn print_help() {
    println!(
        "Commands:\n  help                               Show this help\n  show                               Schedule activities with normal times\n  add <id> <normal_time> [normal_cost] [preds_csv]\n                                     Upsert an activity (preds like A,B)\n  setcrash <id> <crash_time> <crash_cost>\n                                     Set crash time and cost\n  est <id> <a> <m> <b>               Set three-point estimates\n  delete <id>                        Delete an activity and its references\n  load <csv|json> <path>             Load activities (json may carry crashing costs)\n  config <json_path>                 Load analysis settings\n  pert                               Run PERT analysis\n  critical                           Show critical activities from the PERT run\n  prob <T>                           P(duration <= T)\n  range <T1> <T2>                    P(T1 <= duration <= T2)\n  deadline <p>                       Deadline met with probability p\n  costs <fixed> <penalty> <after>    Set crashing cost model\n  crash                              Run crashing analysis\n  queue <lambda> <mu> [s] [max_n]    Solve an M/M/s queue\n  decision <json_path> [formulas]    Evaluate a decision table\n  quit|exit                          Exit"
    );
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive(tracing::Level::WARN.into()),
        )
        .with_writer(io::stderr)
        .init();

    let mut session = Session::new();
    println!("Ops Analytics (CLI) - type 'help' for commands\n");

    let stdin = io::stdin();
    let mut line = String::new();
    loop {
        print!("> ");
        let _ = io::stdout().flush();
        line.clear();
        match stdin.read_line(&mut line) {
            Ok(0) | Err(_) => break,
            Ok(_) => {}
        }
        let input = line.trim();
        if input.is_empty() {
            continue;
        }

        let mut parts = input.split_whitespace();
        let cmd = parts.next().unwrap_or("");

        match cmd {
            "help" => print_help(),
            "quit" | "exit" => break,
            "show" => {
                let scheduled =
                    ActivityDag::build_with_config(&session.activities, session.config.clone())
                        .and_then(|mut dag| {
                            schedule(&mut dag, DurationSelector::Normal).map(|s| (dag, s))
                        });
                match scheduled {
                    Ok((dag, summary)) => {
                        println!("Scheduled ({})", summary.to_cli_summary());
                        print_frame(activities_frame(&dag.to_activity_nodes()));
                    }
                    Err(e) => println!("Schedule error: {e}"),
                }
            }
            "add" => {
                let id = parts.next();
                let time_s = parts.next();
                let (Some(id), Some(time_s)) = (id, time_s) else {
                    println!("Usage: add <id> <normal_time> [normal_cost] [preds_csv]");
                    continue;
                };
                let Some(normal_time) = parse_number(Some(time_s), "normal_time") else {
                    continue;
                };
                let normal_cost = match parts.next() {
                    Some(cost_s) => match parse_number(Some(cost_s), "normal_cost") {
                        Some(v) => v,
                        None => continue,
                    },
                    None => 0.0,
                };
                let preds = parts.next().map(parse_predecessors).unwrap_or_default();
                let mut activity = Activity::new(id, normal_time, normal_cost);
                activity.predecessors = preds;
                if let Some(existing) = session.activities.iter().find(|a| a.id == id) {
                    activity.crash_time = existing.crash_time;
                    activity.crash_cost = existing.crash_cost;
                    activity.optimistic = existing.optimistic;
                    activity.most_likely = existing.most_likely;
                    activity.pessimistic = existing.pessimistic;
                }
                if session.upsert(activity) {
                    println!("Added activity {id}.");
                } else {
                    println!("Updated activity {id}.");
                }
            }
            "setcrash" => {
                let id = parts.next();
                let time = parse_number(parts.next(), "crash_time");
                let cost = parse_number(parts.next(), "crash_cost");
                match (id, time, cost) {
                    (Some(id), Some(time), Some(cost)) => {
                        match session.activities.iter_mut().find(|a| a.id == id) {
                            Some(activity) => {
                                activity.crash_time = Some(time);
                                activity.crash_cost = Some(cost);
                                session.pert = None;
                                println!("Crash data set for {id}.");
                            }
                            None => println!("Activity {id} not found."),
                        }
                    }
                    _ => println!("Usage: setcrash <id> <crash_time> <crash_cost>"),
                }
            }
            "est" => {
                let id = parts.next();
                let a = parse_number(parts.next(), "a");
                let m = parse_number(parts.next(), "m");
                let b = parse_number(parts.next(), "b");
                match (id, a, m, b) {
                    (Some(id), Some(a), Some(m), Some(b)) => {
                        match session.activities.iter_mut().find(|act| act.id == id) {
                            Some(activity) => {
                                activity.optimistic = Some(a);
                                activity.most_likely = Some(m);
                                activity.pessimistic = Some(b);
                                session.pert = None;
                                println!("Estimates set for {id}.");
                            }
                            None => println!("Activity {id} not found."),
                        }
                    }
                    _ => println!("Usage: est <id> <a> <m> <b>"),
                }
            }
            "delete" => match parts.next() {
                Some(id) => {
                    if session.delete(id) {
                        println!("Deleted activity {id}.");
                    } else {
                        println!("Activity {id} not found.");
                    }
                }
                None => println!("Usage: delete <id>"),
            },
            "load" => {
                let fmt = parts.next();
                let path = parts.next();
                match (fmt, path) {
                    (Some("csv"), Some(path)) => match load_activities_from_csv(path) {
                        Ok(activities) => {
                            session.activities = activities;
                            session.pert = None;
                            println!("Loaded {} activities from {path}.", session.activities.len());
                        }
                        Err(e) => println!("Error loading activities: {e}"),
                    },
                    (Some("json"), Some(path)) => match load_project_from_json(path) {
                        Ok(project) => {
                            session.activities = project.activities;
                            session.parameters = project.crashing;
                            session.pert = None;
                            println!("Loaded {} activities from {path}.", session.activities.len());
                        }
                        Err(e) => println!("Error loading activities: {e}"),
                    },
                    _ => println!("Usage: load <csv|json> <path>"),
                }
            }
            "config" => match parts.next() {
                Some(path) => match load_config_from_json(path) {
                    Ok(config) => {
                        session.config = config;
                        session.pert = None;
                        println!("Settings loaded from {path}.");
                    }
                    Err(e) => println!("Error loading settings: {e}"),
                },
                None => println!("Usage: config <json_path>"),
            },
            "pert" => {
                if let Some(pert) = session.pert() {
                    println!(
                        "PERT (duration={:.4}, variance={:.4}, sd={:.4}, crit_path={})",
                        pert.project_duration,
                        pert.project_variance,
                        pert.standard_deviation,
                        pert.critical_path.join("->")
                    );
                    for warning in &pert.warnings {
                        println!("warning: {warning}");
                    }
                    print_frame(activities_frame(&pert.activities));
                }
            }
            "critical" => {
                if let Some(pert) = session.pert() {
                    print_frame(activities_frame(&pert.activities).and_then(|df| critical_rows(&df)));
                }
            }
            "prob" => {
                let Some(target) = parse_number(parts.next(), "target") else {
                    continue;
                };
                if let Some(pert) = session.pert() {
                    println!(
                        "P(duration <= {target}) = {:.4}",
                        pert.probability_at_most(target)
                    );
                }
            }
            "range" => {
                let lower = parse_number(parts.next(), "lower bound");
                let upper = parse_number(parts.next(), "upper bound");
                let (Some(lower), Some(upper)) = (lower, upper) else {
                    continue;
                };
                if let Some(pert) = session.pert() {
                    println!(
                        "P({lower} <= duration <= {upper}) = {:.4}",
                        pert.probability_between(lower, upper)
                    );
                }
            }
            "deadline" => {
                let Some(p) = parse_number(parts.next(), "probability") else {
                    continue;
                };
                if let Some(pert) = session.pert() {
                    match pert.deadline_for_probability(p) {
                        Some(deadline) => println!("Deadline for p={p}: {deadline:.4}"),
                        None => println!("Probability must be strictly between 0 and 1"),
                    }
                }
            }
            "costs" => {
                let fixed = parse_number(parts.next(), "fixed cost");
                let penalty = parse_number(parts.next(), "penalty cost");
                let after = parse_number(parts.next(), "penalty start");
                match (fixed, penalty, after) {
                    (Some(fixed), Some(penalty), Some(after)) => {
                        session.parameters = CrashingParameters::new(fixed, penalty, after);
                        println!("Cost model set.");
                    }
                    _ => println!("Usage: costs <fixed> <penalty> <after>"),
                }
            }
            "crash" => match analyze_crashing_with_config(
                &session.activities,
                &session.parameters,
                session.config.clone(),
            ) {
                Ok(analysis) => {
                    print_frame(crash_steps_frame(&analysis.steps));
                    println!(
                        "Optimal duration {:.4} at cost {:.4} (minimum duration {:.4}, stopped: {:?})",
                        analysis.optimal_time,
                        analysis.optimal_cost,
                        analysis.minimum_duration,
                        analysis.termination
                    );
                }
                Err(e) => println!("Crashing error: {e}"),
            },
            "queue" => {
                let lambda = parse_number(parts.next(), "lambda");
                let mu = parse_number(parts.next(), "mu");
                let (Some(lambda), Some(mu)) = (lambda, mu) else {
                    println!("Usage: queue <lambda> <mu> [s] [max_n]");
                    continue;
                };
                let servers = parts.next().and_then(|s| s.parse::<u32>().ok()).unwrap_or(1);
                let max_n = parts
                    .next()
                    .and_then(|s| s.parse::<usize>().ok())
                    .unwrap_or(ops_analytics::queuing::DEFAULT_MAX_STATES);
                let solved = QueuingModel::new(lambda, mu, servers)
                    .and_then(|model| model.solve().map(|metrics| (model, metrics)));
                match solved {
                    Ok((model, m)) => {
                        println!(
                            "Queue solved (rho={:.4}, L={:.4}, Lq={:.4}, W={:.4}, Wq={:.4}, P0={:.4})",
                            m.rho, m.l, m.lq, m.w, m.wq, m.p0
                        );
                        match model.probability_distribution(max_n) {
                            Ok(dist) => print_frame(queue_distribution_frame(&dist)),
                            Err(e) => println!("Queue error: {e}"),
                        }
                    }
                    Err(e) => println!("Queue error: {e}"),
                }
            }
            "decision" => {
                let Some(path) = parts.next() else {
                    println!("Usage: decision <json_path> [formulas]");
                    continue;
                };
                let with_formulas = parts.next() == Some("formulas");
                let table = match load_decision_table_from_json(path) {
                    Ok(table) => table,
                    Err(e) => {
                        println!("Error loading decision table: {e}");
                        continue;
                    }
                };
                match table.evaluate() {
                    Ok(analysis) => {
                        print_frame(payoff_frame(&analysis));
                        print_frame(regret_frame(&analysis));
                        println!(
                            "Best expected value: decision {} = {:.4}",
                            analysis.best_expected.decision, analysis.best_expected.value
                        );
                        println!(
                            "Expected value with perfect information: {:.4}",
                            analysis.expected_value_with_perfect_information
                        );
                        println!(
                            "Value of perfect information: {:.4}",
                            analysis.value_of_perfect_information
                        );
                        println!(
                            "Minimax regret: decision {} = {:.4}",
                            analysis.minimax_regret.decision, analysis.minimax_regret.value
                        );
                        if with_formulas {
                            let formulas =
                                DecisionFormulas::annotate(&analysis, &SheetLayout::default());
                            for (q, cell) in analysis.decisions.iter().zip(&formulas.expected_values) {
                                println!("EV[{q}] {}", cell.formula);
                            }
                            println!(
                                "EVPI {}",
                                formulas.expected_value_with_perfect_information.formula
                            );
                            for (q, cell) in analysis.decisions.iter().zip(&formulas.max_regrets) {
                                println!("MaxRegret[{q}] {}", cell.formula);
                            }
                        }
                    }
                    Err(e) => println!("Decision error: {e}"),
                }
            }
            _ => println!("Unknown command. Type 'help'."),
        }
    }
}
