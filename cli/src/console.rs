//! Console rendering for analysis output.

use std::path::Path;

use anyhow::Result;

use codesim_analysis::{AnalysisReport, EnhancedAnalysis, LanguageProfile, extract_stats};
use codesim_embeddings::{find_similar_pairs, load_records};

/// Characters of code shown per match preview.
const PREVIEW_LEN: usize = 200;

/// Print per-file statistics and similar-code matches for stored embeddings.
pub async fn report(embeddings: &Path, threshold: f64) -> Result<()> {
    let records = load_records(embeddings).await?;
    let profile = LanguageProfile::python();

    println!("\n{}", "=".repeat(60));
    println!(" Code Analysis Report");
    println!("{}", "=".repeat(60));

    println!("\nCode Statistics:");
    println!("{}", "-".repeat(60));
    for record in &records {
        let stats = extract_stats(&profile, &record.filename, &record.code);
        println!("\n {}:", stats.filename);
        println!("  - Total lines: {}", stats.total_lines);
        println!("  - Code lines: {}", stats.code_lines);
        println!("  - Comment lines: {}", stats.comment_lines);
        println!("  - Empty lines: {}", stats.empty_lines);
        println!("  - Functions: {}", stats.functions);
        println!("  - Classes: {}", stats.classes);
    }

    println!("\nSimilar Code Blocks:");
    println!("{}", "-".repeat(60));
    let matches = find_similar_pairs(&records, threshold)?;
    if matches.is_empty() {
        println!("No significantly similar code blocks found.");
    } else {
        for (idx, m) in matches.iter().enumerate() {
            println!(
                "\nMatch #{} (Similarity: {:.2}%)",
                idx + 1,
                m.similarity * 100.0
            );
            println!("Files: {} <-> {}", m.file1, m.file2);
            println!("\nFile 1 preview:");
            println!("{}", indent(&preview(&m.code1)));
            println!("\nFile 2 preview:");
            println!("{}", indent(&preview(&m.code2)));
        }
    }

    Ok(())
}

/// Print the four report sections for every analyzed file.
pub fn print_analyses(analysis: &EnhancedAnalysis) {
    for (filename, report) in &analysis.analyses {
        println!("\nAnalysis for {filename}:");
        match report {
            AnalysisReport::Parsed(parsed) => {
                println!("1. What the code does");
                println!("{}", parsed.what);
                println!("\n2. Key functions or logic patterns");
                println!("{}", parsed.key_functions.joined());
                println!("\n3. Any improvements or optimizations");
                println!("{}", parsed.improvements);
                println!("\n4. Complexity or maintainability concerns");
                println!("{}", parsed.complexity);
            }
            AnalysisReport::Unparsed { raw } => {
                println!("1. What the code does");
                println!("{raw}");
                println!("\n2. Key functions or logic patterns");
                println!("N/A");
                println!("\n3. Any improvements or optimizations");
                println!("N/A");
                println!("\n4. Complexity or maintainability concerns");
                println!("N/A");
            }
        }
    }
}

fn preview(code: &str) -> String {
    let truncated: String = code.chars().take(PREVIEW_LEN).collect();
    if truncated.len() < code.len() {
        format!("{truncated}...")
    } else {
        truncated
    }
}

fn indent(text: &str) -> String {
    text.lines()
        .map(|line| format!("  {line}"))
        .collect::<Vec<_>>()
        .join("\n")
}
