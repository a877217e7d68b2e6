//! # Folio CLI
//!
//! Usage:
//!   folio input.json -o output.pdf
//!   echo '{ ... }' | folio -o output.pdf
//!   folio --example > report.json
//!
//! Set `RUST_LOG=info` to see diagnostics (missing styles, page breaks).

use std::env;
use std::fs;
use std::io::{self, Read};
use std::process;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args: Vec<String> = env::args().collect();

    // Handle --example flag
    if args.iter().any(|a| a == "--example") {
        print!("{}", example_report_json());
        return;
    }

    // Read input
    let input = if args.len() > 1 && !args[1].starts_with('-') {
        fs::read_to_string(&args[1]).map_err(|e| format!("Failed to read {}: {}", args[1], e))
    } else {
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .map(|_| buf)
            .map_err(|e| format!("Failed to read stdin: {}", e))
    };
    let input = input.unwrap_or_else(|msg| fail(&msg));

    // Parse output path
    let output_path = args
        .windows(2)
        .find(|w| w[0] == "-o")
        .map(|w| w[1].clone())
        .unwrap_or_else(|| "output.pdf".to_string());

    // Render
    match folio::render_json(&input) {
        Ok(pdf_bytes) => {
            if let Err(e) = fs::write(&output_path, &pdf_bytes) {
                fail(&format!("Failed to write {}: {}", output_path, e));
            }
            eprintln!("✓ Written {} bytes to {}", pdf_bytes.len(), output_path);
        }
        Err(e) => fail(&e.to_string()),
    }
}

fn fail(message: &str) -> ! {
    eprintln!("✗ {}", message);
    process::exit(1);
}

fn example_report_json() -> &'static str {
    r##"{
  "metadata": {
    "title": "Quarterly Report",
    "author": "Folio"
  },
  "defaults": {
    "fontFamily": "Helvetica",
    "fontSize": 11,
    "culture": "en-US"
  },
  "resources": {
    "type:Paragraph": {
      "target": "Paragraph",
      "setters": { "lineHeight": 1.4, "orphans": 2, "widows": 2 }
    },
    "Heading": {
      "target": "Paragraph",
      "setters": { "fontSize": 22, "fontWeight": 700 }
    },
    "Muted": {
      "target": "Paragraph",
      "setters": { "fontSize": 9, "color": { "r": 0.4, "g": 0.4, "b": 0.4 } }
    },
    "Label": {
      "target": "Paragraph",
      "basedOn": "Muted",
      "setters": { "fontWeight": 700, "textTransform": "Uppercase" }
    }
  },
  "pages": [
    {
      "config": {
        "size": "A4",
        "margin": { "top": 54, "right": 54, "bottom": 54, "left": 54 }
      },
      "resources": {
        "Banner": {
          "target": "HorizontalStack",
          "setters": {
            "background": { "r": 0.93, "g": 0.95, "b": 0.98 },
            "borderColor": { "r": 0.75, "g": 0.8, "b": 0.88 },
            "borderWidth": 0.5,
            "padding": { "top": 12, "right": 12, "bottom": 12, "left": 12 },
            "spacing": 24
          }
        }
      },
      "content": {
        "kind": {
          "type": "VerticalStack",
          "spacing": 12,
          "children": [
            {
              "kind": { "type": "Paragraph", "text": "Quarterly Report" },
              "style": "Heading",
              "id": "title"
            },
            {
              "kind": {
                "type": "HorizontalStack",
                "children": [
                  { "kind": { "type": "Paragraph", "text": "Prepared by" }, "style": "Label" },
                  { "kind": { "type": "Paragraph", "text": "Operations" } },
                  { "kind": { "type": "Paragraph", "text": "Period" }, "style": "Label" },
                  { "kind": { "type": "Paragraph", "text": "Q1 2026" } }
                ]
              },
              "style": "Banner"
            },
            { "kind": { "type": "Line", "thickness": 0.5 } },
            {
              "kind": {
                "type": "Grid",
                "columns": [{ "Star": 2 }, { "Fixed": 80 }, { "Fixed": 80 }],
                "columnSpacing": 8,
                "rowSpacing": 4,
                "cells": [
                  { "row": 0, "column": 0, "element": { "kind": { "type": "Paragraph", "text": "Region" }, "style": "Label" } },
                  { "row": 0, "column": 1, "element": { "kind": { "type": "Paragraph", "text": "Units" }, "style": "Label" } },
                  { "row": 0, "column": 2, "element": { "kind": { "type": "Paragraph", "text": "Revenue" }, "style": "Label" } },
                  { "row": 1, "column": 0, "element": { "kind": { "type": "Paragraph", "text": "North" } } },
                  { "row": 1, "column": 1, "element": { "kind": { "type": "Paragraph", "text": "1,240", "textAlign": "Right" } } },
                  { "row": 1, "column": 2, "element": { "kind": { "type": "Paragraph", "text": "$48,600", "textAlign": "Right" } } },
                  { "row": 2, "column": 0, "element": { "kind": { "type": "Paragraph", "text": "South" } } },
                  { "row": 2, "column": 1, "element": { "kind": { "type": "Paragraph", "text": "980", "textAlign": "Right" } } },
                  { "row": 2, "column": 2, "element": { "kind": { "type": "Paragraph", "text": "$37,150", "textAlign": "Right" } } }
                ]
              }
            },
            {
              "kind": {
                "type": "Paragraph",
                "text": "Long paragraphs flow onto further pages on their own. Whatever does not fit at the bottom of a page is carried to the next one with its styling intact, and the orphan and widow settings above keep single lines from being stranded at either end of a break."
              }
            }
          ]
        }
      }
    }
  ]
}
"##
}
