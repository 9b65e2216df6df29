//! End-to-end book build with a stand-in converter.

use std::fs;
use std::path::Path;
use tempfile::TempDir;
use texbook::{
    BookBuilder, BookConfig, DocumentConverter, Error, Rasterizer, Result, SectionSpec, SplitRule,
};

/// Mimics Pandoc's Markdown writer for the handful of constructs used here.
struct FakePandoc;

impl DocumentConverter for FakePandoc {
    fn name(&self) -> &str {
        "fake-pandoc"
    }

    fn convert(&self, latex: &str, _media_dir: &Path) -> Result<String> {
        if latex.contains("FAIL") {
            return Err(Error::ExternalTool {
                tool: self.name().to_string(),
                status: Some(64),
                stderr: "unsupported construct".to_string(),
            });
        }

        let mut out = String::from("---\ntitle: converted\n---\n\n");
        for line in latex.lines() {
            if let Some(rest) = line.strip_prefix("\\section{") {
                out.push_str(&format!("# {}", rest.trim_end_matches('}')));
            } else if let Some(rest) = line.strip_prefix("\\subsubsection{") {
                out.push_str(&format!("#### {}", rest.trim_end_matches('}')));
            } else {
                out.push_str(&line.replace('@', "\\@"));
            }
            out.push('\n');
        }
        Ok(out)
    }
}

fn write(root: &Path, relative: &str, content: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn manuscript(root: &Path) {
    write(
        root,
        "main.tex",
        "\\documentclass{article}\n\\title{Test Book}\n\\begin{document}\n\\begin{abstract}\n\\noindent Abstract text.\n\\end{abstract}\n\\end{document}\n",
    );
    write(root, "references.bib", "@article{a,\n  title = {Caf\u{e9} \u{2013} Study},\n  year = {2020}\n}\n");
    write(root, "acronyms.tex", "\\newacronym{llm}{LLM}{large language model}\n");
    write(
        root,
        "sections/intro.tex",
        concat!(
            "\\section{Introduction}\n",
            "See \\cite{a,b}.\n",
            "\\subsubsection{Deep}\n",
            "Using [LLM]{acronym-label=\"llm\"}.\n",
            "\\input{tables/t1}\n",
            "![Plot](figures/plot.pdf)\n",
        ),
    );
    write(root, "tables/t1.tex", "TABLE CONTENT");
    write(
        root,
        "sections/apps.tex",
        "\\section{Applications}\nFirst part.\n\n\\section{Accelerating Applications}\nSecond part.\n",
    );
    write(root, "sections/bad.tex", "\\section{Broken}\nFAIL here\n");
    write(root, "figures/plot.pdf", "%PDF");
    write(root, "figures/plot.png", "png");
}

fn config(eq_dir: &Path) -> BookConfig {
    BookConfig {
        sections: vec![
            SectionSpec::new("intro.tex", "01-intro.qmd", "Introduction"),
            SectionSpec::new("part1.tex", "02-apps.qmd", "Applications"),
            SectionSpec::new("part2.tex", "03-accel.qmd", "Accelerating Applications"),
            SectionSpec::new("bad.tex", "04-bad.qmd", "Broken"),
            SectionSpec::new("missing.tex", "05-missing.qmd", "Missing"),
        ],
        split: Some(SplitRule {
            source: "apps.tex".to_string(),
            heading: "Accelerating Applications".to_string(),
            first: "part1.tex".to_string(),
            second: "part2.tex".to_string(),
        }),
        equation_images_dir: Some(eq_dir.to_path_buf()),
        ..BookConfig::default()
    }
}

#[test]
fn test_full_build() {
    let input = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();
    let eq = TempDir::new().unwrap();
    manuscript(input.path());
    fs::write(eq.path().join("infonce.png"), "png").unwrap();

    let builder = BookBuilder::new(config(eq.path()))
        .with_converter(Box::new(FakePandoc))
        .with_rasterizer(Rasterizer::new().with_tools(Vec::new()));
    let report = builder.build(input.path(), output.path(), "media").unwrap();
    let read = |name: &str| fs::read_to_string(output.path().join(name)).unwrap();

    assert_eq!(report.sections_converted, 3);
    assert_eq!(report.sections_fallback, 1);
    assert_eq!(report.sections_missing, vec!["missing.tex".to_string()]);
    assert_eq!(report.acronyms, 1);
    assert_eq!(report.equation_images, 1);
    assert!(report.pages.contains(&"index.qmd".to_string()));
    assert!(!report.pages.contains(&"05-missing.qmd".to_string()));

    let intro = read("01-intro.qmd");
    assert!(intro.starts_with("---\nformat:\n"));
    assert!(intro.contains("other-links:"));
    assert!(!intro.contains("title: converted"));
    assert!(intro.contains("See [@a; @b]."));
    assert!(intro.contains("\n## Deep\n"));
    assert!(intro.contains("Using {{< acr llm >}}."));
    assert!(intro.contains("TABLE CONTENT"));
    assert!(intro.contains(r#"src="media/figures/plot.png""#));
    assert!(intro.contains(r#"width="100%""#));

    let apps = read("02-apps.qmd");
    assert!(apps.contains("# Applications"));
    assert!(!apps.contains("Accelerating"));
    assert!(read("03-accel.qmd").contains("# Accelerating Applications"));

    let broken = read("04-bad.qmd");
    assert!(broken.contains("# Broken"));
    assert!(broken.contains("needs manual review"));

    let index = read("index.qmd");
    assert!(index.contains("# Test Book {.unnumbered}"));
    assert!(index.contains("## Abstract\n\nAbstract text."));
    assert!(index.contains("1. [Introduction](01-intro.qmd)"));
    assert!(read("09-references.qmd").contains("::: {#refs}\n:::"));

    assert!(read("references.bib").contains("Caf\u{e9} - Study"));
    assert!(read("acronyms.yml").contains("key: llm"));
    assert!(read("_quarto.yml").contains("05-missing.qmd"));
    assert!(read("styles.css").contains(".chem-formula"));
    assert!(output.path().join("media/figures/plot.png").is_file());
    assert!(output.path().join("media/eq_images/infonce.png").is_file());
}

#[test]
fn test_build_without_optional_inputs() {
    let input = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();
    write(input.path(), "sections/intro.tex", "\\section{Introduction}\nBody.\n");

    let config = BookConfig {
        sections: vec![SectionSpec::new("intro.tex", "01-intro.qmd", "Introduction")],
        split: None,
        equation_images_dir: Some(input.path().join("no-such-dir")),
        ..BookConfig::default()
    };
    let report = BookBuilder::new(config)
        .with_converter(Box::new(FakePandoc))
        .with_rasterizer(Rasterizer::new().with_tools(Vec::new()))
        .build(input.path(), output.path(), "media")
        .unwrap();

    assert_eq!(report.sections_converted, 1);
    let steps: Vec<&str> = report
        .warnings
        .iter()
        .filter_map(|w| w.split(':').next())
        .collect();
    assert!(steps.contains(&"bibliography"));
    assert!(steps.contains(&"index"));
    assert!(steps.contains(&"acronyms"));
    assert!(output.path().join("_quarto.yml").is_file());
    assert!(output.path().join("09-references.qmd").is_file());
}
