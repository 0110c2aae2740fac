//! Whole-document classification tests.
//!
//! These run pre-extracted text through the public API, so they need no
//! pdfium library and always run.

use paper2md::{
    classify_document, convert_batch, convert_text, Category, ClassifierConfig, ContainerMetadata,
    ConversionConfig, MetadataExtractor,
};

const RESNET: &str = "\
Deep Residual Learning for Image Recognition
Kaiming He,  Xiangyu Zhang,  Shaoqing Ren
Microsoft Research
{kahe, v-xiangz}@microsoft.com

Abstract
Deeper neural networks are more difficult to train.
We present a residual learning framework.

1. Introduction
Deep networks naturally integrate features.
y = F(x, {W_i}) + x (1)
Table 1: Error rates on ImageNet.
method top-1 top-5
plain-18 27.94 9.81
plain-34 28.54 10.02
ResNet-18 27.88 9.55
ResNet-34 25.03 7.76

row after a blank line
ResNet-50 22.85 6.71
ResNet-101 21.75 6.05
ResNet-152 21.43 5.71
3.1 Residual Learning
• Identity mappings help.
- Shortcuts add no parameters.
REFERENCES
[1] Y. LeCun. Gradient-based learning.";

fn count(out: &paper2md::ConversionOutput, category: &str) -> usize {
    out.stats.categories.get(category).copied().unwrap_or(0)
}

#[test]
fn resnet_metadata() {
    let out = convert_text(RESNET, &ContainerMetadata::default(), &ConversionConfig::default());
    let meta = &out.metadata;

    assert_eq!(meta.title.as_deref(), Some("Deep Residual Learning for Image Recognition"));
    assert_eq!(meta.authors, vec!["Kaiming He", "Xiangyu Zhang", "Shaoqing Ren"]);
    assert_eq!(meta.venue.as_deref(), Some("Microsoft Research"));
    assert_eq!(
        meta.abstract_text.as_deref(),
        Some("Deeper neural networks are more difficult to train. We present a residual learning framework.")
    );
    assert!(meta.keywords.is_empty());
}

#[test]
fn resnet_line_categories() {
    let out = convert_text(RESNET, &ContainerMetadata::default(), &ConversionConfig::default());

    assert_eq!(out.stats.line_count, 28);
    assert_eq!(count(&out, "title"), 1);
    assert_eq!(count(&out, "author"), 1);
    assert_eq!(count(&out, "affiliation"), 2);
    assert_eq!(count(&out, "abstract_heading"), 1);
    assert_eq!(count(&out, "equation"), 1);
    assert_eq!(count(&out, "table_caption"), 1);
    assert_eq!(count(&out, "table_body"), 10);
    assert_eq!(count(&out, "section"), 2);
    assert_eq!(count(&out, "subsection"), 1);
    assert_eq!(count(&out, "bullet"), 2);

    let total: usize = out.stats.categories.values().sum();
    assert_eq!(total, out.stats.line_count);
}

#[test]
fn resnet_markdown_layout() {
    let out = convert_text(RESNET, &ContainerMetadata::default(), &ConversionConfig::default());
    let md = &out.markdown;

    assert!(md.contains("## Abstract\n"));
    assert!(md.contains("Deeper neural networks are more difficult to train. We present a residual learning framework.\n"));
    assert!(md.contains("## 1. Introduction\n"));
    assert!(md.contains("$$\ny = F(x, {W_i}) + x\n$$ (Eq. 1)"));
    assert!(md.contains("**Table 1: Error rates on ImageNet.**"));
    assert!(md.contains("### 3.1 Residual Learning\n"));
    assert!(md.contains("• Identity mappings help.\n"));
    assert!(md.contains("- Shortcuts add no parameters.\n"));
    assert!(md.contains("## REFERENCES\n"));
    assert!(md.contains("[1] Y. LeCun. Gradient-based learning.\n"));

    // Metadata-only lines and the swallowed table body never reach the body.
    assert!(!md.contains("Kaiming He"));
    assert!(!md.contains("@microsoft.com"));
    assert!(!md.contains("ResNet-34"));
    assert!(!md.contains("row after a blank line"));

    let abs = md.find("## Abstract").unwrap();
    let intro = md.find("## 1. Introduction").unwrap();
    let table = md.find("**Table 1").unwrap();
    let refs = md.find("## REFERENCES").unwrap();
    assert!(abs < intro && intro < table && table < refs);
}

#[test]
fn resnet_bibtex() {
    let out = convert_text(RESNET, &ContainerMetadata::default(), &ConversionConfig::default());
    let bib = &out.bibtex;

    assert!(bib.starts_with("@inproceedings{He"));
    assert!(bib.contains("  title = {Deep Residual Learning for Image Recognition},\n"));
    assert!(bib.contains("  author = {Kaiming He and Xiangyu Zhang and Shaoqing Ren},\n"));
    assert!(bib.contains("  booktitle = {Microsoft Research},\n"));
    assert!(!bib.contains("journal"));
    assert!(bib.ends_with("}\n"));
}

#[test]
fn conversion_is_deterministic() {
    let config = ConversionConfig::default();
    let a = convert_text(RESNET, &ContainerMetadata::default(), &config);
    let b = convert_text(RESNET, &ContainerMetadata::default(), &config);
    assert_eq!(a.markdown, b.markdown);
    assert_eq!(a.bibtex, b.bibtex);
    assert_eq!(a.metadata, b.metadata);
}

#[test]
fn container_metadata_is_not_overwritten() {
    let container = ContainerMetadata {
        title: Some("Deep Residual Learning".into()),
        author: Some("K. He and X. Zhang".into()),
        creation_date: Some("2015-12-10T00:00:00Z".into()),
        ..Default::default()
    };
    let out = convert_text(RESNET, &container, &ConversionConfig::default());

    assert_eq!(out.metadata.title.as_deref(), Some("Deep Residual Learning"));
    assert_eq!(out.metadata.authors, vec!["K. He", "X. Zhang"]);
    assert_eq!(out.metadata.year.as_deref(), Some("2015"));
    // Fields the container left empty are still back-filled.
    assert_eq!(out.metadata.venue.as_deref(), Some("Microsoft Research"));
    assert!(out.bibtex.starts_with("@inproceedings{He2015,"));
}

#[test]
fn every_line_gets_exactly_one_category() {
    let text = "\u{3000}\n\t\n!!!\n∑∑∑\n(7)\nTable: \n🙂 emoji line\nA\n123\nREFERENCES AND NOTES\n   - \n-\n";
    let config = ClassifierConfig::default();
    let doc = classify_document(text, MetadataExtractor::new(config.abstract_max_chars), &config);
    assert_eq!(doc.categories.len(), text.split('\n').count());
}

#[test]
fn title_window_is_configurable() {
    let text = "\n\n\nA Rather Late Paper Title Line";
    let config = ClassifierConfig::default();
    let doc = classify_document(text, MetadataExtractor::new(config.abstract_max_chars), &config);
    assert_eq!(doc.categories[3], Category::Title);

    let narrow = ClassifierConfig {
        title_window: 2,
        ..ClassifierConfig::default()
    };
    let doc = classify_document(text, MetadataExtractor::new(narrow.abstract_max_chars), &narrow);
    assert_ne!(doc.categories[3], Category::Title);
    assert!(doc.metadata.title.is_none());
}

#[test]
fn batch_names_outputs_after_titles() {
    let dir = tempfile::tempdir().unwrap();
    let titled = dir.path().join("survey.txt");
    let untitled = dir.path().join("notes.txt");
    std::fs::write(&titled, "Graph Networks: A Survey Of Methods\nbody text").unwrap();
    std::fs::write(&untitled, "only lowercase prose here").unwrap();
    let out_dir = dir.path().join("out");

    let inputs = [
        titled.to_string_lossy().to_string(),
        untitled.to_string_lossy().to_string(),
    ];
    let report = tokio_test::block_on(convert_batch(&inputs[..], &out_dir, &ConversionConfig::default()));

    assert!(report.failed.is_empty(), "failures: {:?}", report.failed);
    assert!(out_dir.join("Graph_Networks_A_Survey_Of_Methods.md").exists());
    assert!(out_dir.join("Graph_Networks_A_Survey_Of_Methods.bib").exists());
    assert!(out_dir.join("notes.md").exists());

    let bib = std::fs::read_to_string(out_dir.join("notes.bib")).unwrap();
    assert!(bib.starts_with("@article{Unknown"));
}

#[test]
fn batch_without_bibtex() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("paper.txt");
    std::fs::write(&input, "Sparse Attention For Long Documents\n").unwrap();
    let out_dir = dir.path().join("out");

    let config = ConversionConfig::builder().write_bibtex(false).build().unwrap();
    let inputs = [input.to_string_lossy().to_string()];
    let report = tokio_test::block_on(convert_batch(&inputs[..], &out_dir, &config));

    assert_eq!(report.succeeded.len(), 1);
    assert!(report.succeeded[0].bibtex_path.is_none());
    assert!(!out_dir.join("Sparse_Attention_For_Long_Documents.bib").exists());
}
