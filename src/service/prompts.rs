//! Prompt texts sent to `/ask`.

use crate::utils::config::{ANALYSIS_SEPARATOR, EnrichConsts};

pub fn file_prompt(name: &str, content: &str) -> String {
    format!(
        "Please describe the content of this file named '{name}' in 250 words maximum based on the following content (first {} characters):\n\n{content}",
        EnrichConsts::MAX_CONTENT_CHARS
    )
}

pub fn folder_prompt(name: &str, summary: &str) -> String {
    format!(
        "Please describe this folder named '{name}' in 250 words maximum based on its contents below:\n\n{summary}"
    )
}

pub fn architecture_prompt(label: &str, content: &str) -> String {
    format!(
        "Please analyze the software architecture of this project based on the provided file structure and descriptions from '{label}'. \
Provide detailed recommendations for better architecture, including:\n\n\
1. Current architecture analysis\n\
2. Identified issues and anti-patterns\n\
3. Suggested improvements\n\
4. Recommended folder structure\n\
5. Best practices recommendations\n\
6. Technology stack optimization suggestions\n\n\
Content to analyze:\n{content}"
    )
}

pub fn combine_prompt(analyses: &[String]) -> String {
    let mut joined = String::new();
    for analysis in analyses {
        joined.push_str(analysis);
        joined.push_str(ANALYSIS_SEPARATOR);
    }
    format!(
        "Please combine and synthesize the following architectural analyses into a comprehensive final report. \
Create a cohesive architectural recommendation document that:\n\n\
1. Consolidates all findings into a unified analysis\n\
2. Removes redundancy while preserving important details\n\
3. Provides a clear executive summary\n\
4. Presents actionable recommendations in priority order\n\
5. Includes a proposed implementation roadmap\n\n\
Analyses to combine:\n\n{joined}"
    )
}
