//! Declarative crew configuration and the default travel-planning crew.

mod request;

use serde::{Deserialize, Serialize};

use crate::agent::DEFAULT_MAX_ITERATIONS;

pub use request::{split_list, TripRequest, INPUT_KEYS};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentSpec {
    pub id: String,
    pub role: String,
    pub goal: String,
    pub backstory: String,
    #[serde(default)]
    pub tools: Vec<String>,
    #[serde(default = "default_max_iterations")]
    pub max_iterations: u32,
}

fn default_max_iterations() -> u32 {
    DEFAULT_MAX_ITERATIONS
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskSpec {
    pub id: String,
    pub agent: String,
    pub description: String,
    pub expected_output: String,
    /// `None` depends on the previous task; `Some([])` has no dependencies.
    #[serde(default)]
    pub context: Option<Vec<String>>,
    #[serde(default)]
    pub output_file: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrewConfig {
    #[serde(default = "travel_agents")]
    pub agents: Vec<AgentSpec>,
    #[serde(default = "travel_tasks")]
    pub tasks: Vec<TaskSpec>,
}

impl Default for CrewConfig {
    fn default() -> Self {
        Self {
            agents: travel_agents(),
            tasks: travel_tasks(),
        }
    }
}

fn agent(id: &str, role: &str, goal: &str, backstory: &str, tools: &[&str]) -> AgentSpec {
    AgentSpec {
        id: id.to_string(),
        role: role.to_string(),
        goal: goal.to_string(),
        backstory: backstory.to_string(),
        tools: tools.iter().map(|t| t.to_string()).collect(),
        max_iterations: DEFAULT_MAX_ITERATIONS,
    }
}

fn travel_agents() -> Vec<AgentSpec> {
    vec![
        agent(
            "city_selector",
            "City Selection Expert",
            "Select the best city based on weather, season, and prices",
            "An expert in analyzing travel data to pick ideal destinations.",
            &["web_search"],
        ),
        agent(
            "local_expert",
            "Local Expert at this city",
            "Provide the BEST insights about the selected city",
            "A knowledgeable local guide with extensive information about the city, its attractions and customs.",
            &["web_search"],
        ),
        agent(
            "travel_concierge",
            "Amazing Travel Concierge",
            "Create the most amazing travel itineraries with budget and packing suggestions for the city",
            "Specialist in travel planning and logistics with decades of experience.",
            &["web_search", "calculator", "file_writer"],
        ),
    ]
}

const IDENTIFY_DESCRIPTION: &str = "\
Analyze and select the best city for the trip based on specific criteria such as weather \
patterns, seasonal events, and travel costs. Compare the candidate cities, considering current \
weather conditions, upcoming cultural or seasonal events, and overall travel expenses.

Traveling from: {origin}
City Options: {cities}
Trip Date: {date_range}
Traveler Interests: {interests}";

const IDENTIFY_EXPECTED: &str = "\
A detailed report on the chosen city and everything found out about it, including actual \
flight costs, the weather forecast and attractions.";

const GATHER_DESCRIPTION: &str = "\
As a local expert on this city, compile an in-depth guide for someone traveling there who wants \
the best trip ever. Gather information about key attractions, local customs, special events, and \
daily activity recommendations. Find the spots only a local would know. The guide should give a \
thorough overview of what the city offers: hidden gems, cultural hotspots, must-visit landmarks, \
weather forecasts, and high level costs.

Trip Date: {date_range}
Traveling from: {origin}
Traveler Interests: {interests}";

const GATHER_EXPECTED: &str = "\
A comprehensive city guide, rich in cultural insights and practical tips, tailored to enhance \
the travel experience.";

const PLAN_DESCRIPTION: &str = "\
Expand this guide into a full 7-day travel itinerary with detailed per-day plans, including \
weather forecasts, places to eat, packing suggestions, and a budget breakdown.

Suggest actual places to visit, actual hotels to stay at and actual restaurants to go to. The \
itinerary should cover the whole trip from arrival to departure, integrating the city guide \
with practical travel logistics.

Trip Date: {date_range}
Traveling from: {origin}
Traveler Interests: {interests}";

const PLAN_EXPECTED: &str = "\
A complete expanded travel plan formatted as markdown, with a daily schedule, anticipated \
weather conditions, recommended clothing and items to pack, and a detailed budget. Explain why \
each place was picked and what makes it special.";

pub const DEFAULT_OUTPUT_FILE: &str = "output/travel_plan.md";

fn travel_tasks() -> Vec<TaskSpec> {
    vec![
        TaskSpec {
            id: "identify_city".to_string(),
            agent: "city_selector".to_string(),
            description: IDENTIFY_DESCRIPTION.to_string(),
            expected_output: IDENTIFY_EXPECTED.to_string(),
            context: Some(Vec::new()),
            output_file: None,
        },
        TaskSpec {
            id: "gather_city_guide".to_string(),
            agent: "local_expert".to_string(),
            description: GATHER_DESCRIPTION.to_string(),
            expected_output: GATHER_EXPECTED.to_string(),
            context: None,
            output_file: None,
        },
        TaskSpec {
            id: "plan_itinerary".to_string(),
            agent: "travel_concierge".to_string(),
            description: PLAN_DESCRIPTION.to_string(),
            expected_output: PLAN_EXPECTED.to_string(),
            context: Some(vec![
                "identify_city".to_string(),
                "gather_city_guide".to_string(),
            ]),
            output_file: Some(DEFAULT_OUTPUT_FILE.to_string()),
        },
    ]
}
