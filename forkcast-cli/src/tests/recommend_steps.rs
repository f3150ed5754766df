//! Behaviour-driven step definitions driving the recommend CLI scenarios.

use super::helpers::{Artefacts, MG_ROAD};
use super::*;
use crate::recommend::{GeocoderBuilder, RecommendConfig, run_recommend_with};
use forkcast_core::test_support::StubGeocoder;
use forkcast_core::{GeocodeError, Geocoder};
use geo::Coord;
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use std::cell::{Cell, RefCell};

const EXPECTED_LINES: [&str; 3] = [
    "Toit: Wings - 1500 - Rating: 4.7 - Location: Indiranagar",
    "MTR: Rava Idli, Dosa - 300 - Rating: 4.6 - Location: Basavanagudi",
    "Truffles: Cheeseburger - 900 - Rating: 4.5 - Location: Koramangala",
];

struct RecommendWorld {
    artefacts: Artefacts,
    cli_args: RefCell<Vec<String>>,
    geocode_answer: RefCell<Result<Coord<f64>, GeocodeError>>,
    stdout: RefCell<Vec<u8>>,
    result: RefCell<Option<Result<(), CliError>>>,
    geocoder_builds: Cell<usize>,
}

impl RecommendWorld {
    fn new() -> Self {
        Self {
            artefacts: Artefacts::new(),
            cli_args: RefCell::new(Vec::new()),
            geocode_answer: RefCell::new(Err(GeocodeError::Transport {
                message: "no geocoder configured".to_owned(),
            })),
            stdout: RefCell::new(Vec::new()),
            result: RefCell::new(None),
            geocoder_builds: Cell::new(0),
        }
    }

    fn push_args<const N: usize>(&self, args: [&str; N]) {
        self.cli_args
            .borrow_mut()
            .extend(args.iter().map(|arg| (*arg).to_owned()));
    }

    fn build_command_line(&self) -> Vec<String> {
        let mut argv = vec![
            "forkcast".to_owned(),
            "recommend".to_owned(),
            format!("--{ARG_ARTEFACTS_DIR}"),
            self.artefacts.root().as_str().to_owned(),
        ];
        argv.extend(self.cli_args.borrow().iter().cloned());
        argv
    }

    fn stdout_text(&self) -> String {
        String::from_utf8(self.stdout.borrow().clone()).expect("stdout utf-8")
    }

    fn assert_succeeded(&self) {
        let borrowed = self.result.borrow();
        let result = borrowed.as_ref().expect("result recorded");
        if let Err(err) = result {
            panic!("expected success, found {err:?}");
        }
    }
}

impl GeocoderBuilder for RecommendWorld {
    fn build(&self, _config: &RecommendConfig) -> Result<Box<dyn Geocoder>, CliError> {
        self.geocoder_builds.set(self.geocoder_builds.get() + 1);
        let stub = match self.geocode_answer.borrow().clone() {
            Ok(location) => StubGeocoder::found(location),
            Err(error) => StubGeocoder::failing(error),
        };
        Ok(Box::new(stub))
    }
}

#[fixture]
fn world() -> RecommendWorld {
    RecommendWorld::new()
}

// --- Given steps ---

#[given("prepared artefacts exist on disk")]
fn prepared_artefacts(#[from(world)] world: &RecommendWorld) {
    world.artefacts.prepare();
}

#[given("I search around MG Road by coordinates")]
fn search_by_coordinates(#[from(world)] world: &RecommendWorld) {
    world.push_args(["--lat", "12.9716", "--lon", "77.5946"]);
}

#[given("I search around an address with a LocationIQ key")]
fn search_by_address(#[from(world)] world: &RecommendWorld) {
    world.push_args([
        "--address",
        "MG Road, Bengaluru",
        "--locationiq-key",
        "pk.test",
    ]);
}

#[given("the geocoder places the address on MG Road")]
fn geocoder_resolves(#[from(world)] world: &RecommendWorld) {
    *world.geocode_answer.borrow_mut() = Ok(MG_ROAD);
}

#[given("the geocoder cannot resolve the address")]
fn geocoder_fails(#[from(world)] world: &RecommendWorld) {
    *world.geocode_answer.borrow_mut() = Err(GeocodeError::NotFound {
        address: "MG Road, Bengaluru".to_owned(),
    });
}

#[given("I ask for JSON output")]
fn json_output(#[from(world)] world: &RecommendWorld) {
    world.push_args(["--format", "json"]);
}

#[given("I set the budget to 5000")]
fn excessive_budget(#[from(world)] world: &RecommendWorld) {
    world.push_args(["--budget", "5000"]);
}

// --- When steps ---

#[when("I run the recommend command")]
fn run_recommend_command(#[from(world)] world: &RecommendWorld) {
    let invocation = world.build_command_line();
    let parsed = Cli::try_parse_from(invocation).map_err(CliError::from);
    let outcome = parsed.and_then(|cli| match cli.command {
        Command::Recommend(args) => {
            let mut buffer = world.stdout.borrow_mut();
            run_recommend_with(args, world, &mut *buffer)
        }
        Command::BuildIndex(_) => panic!("expected recommend command"),
    });
    world.result.replace(Some(outcome));
}

// --- Then steps ---

#[then("the best rated restaurants are printed one per line")]
fn printed_by_rating(#[from(world)] world: &RecommendWorld) {
    world.assert_succeeded();
    let stdout = world.stdout_text();
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines, EXPECTED_LINES);
}

#[then("the geocoder was built once")]
fn geocoder_built_once(#[from(world)] world: &RecommendWorld) {
    assert_eq!(world.geocoder_builds.get(), 1);
}

#[then("the command explains that the address is invalid")]
fn explains_invalid_address(#[from(world)] world: &RecommendWorld) {
    world.assert_succeeded();
    assert_eq!(world.stdout_text(), "Please provide a valid address.\n");
}

#[then("the command prints a JSON report of three restaurants")]
fn prints_json(#[from(world)] world: &RecommendWorld) {
    world.assert_succeeded();
    let report: serde_json::Value =
        serde_json::from_str(&world.stdout_text()).expect("output should be JSON");
    assert_eq!(report["status"], "recommended");
    let names: Vec<&str> = report["restaurants"]
        .as_array()
        .expect("restaurant list")
        .iter()
        .filter_map(|entry| entry["name"].as_str())
        .collect();
    assert_eq!(names, ["Toit", "MTR", "Truffles"]);
}

#[then("the command fails because the budget is out of range")]
fn budget_rejected(#[from(world)] world: &RecommendWorld) {
    let borrowed = world.result.borrow();
    let error = borrowed
        .as_ref()
        .expect("result recorded")
        .as_ref()
        .expect_err("expected error");
    match error {
        CliError::BudgetOutOfRange { value, max } => {
            assert_eq!((*value, *max), (5000, 3000));
        }
        other => panic!("expected BudgetOutOfRange, found {other:?}"),
    }
    assert!(world.stdout_text().is_empty());
}

macro_rules! register_recommend_scenario {
    ($fn_name:ident, $scenario_title:literal) => {
        #[scenario(path = "tests/features/recommend_command.feature", name = $scenario_title)]
        fn $fn_name(#[from(world)] world: RecommendWorld) {
            let _ = world;
        }
    };
}

register_recommend_scenario!(recommend_by_coordinates, "recommending around coordinates");
register_recommend_scenario!(
    recommend_by_address,
    "recommending around a geocoded address"
);
register_recommend_scenario!(
    recommend_unresolvable_address,
    "explaining an unresolvable address"
);
register_recommend_scenario!(recommend_json_report, "printing a JSON report");
register_recommend_scenario!(recommend_excessive_budget, "rejecting an excessive budget");
