use crate::core::{CorrelationEdge, PostureReport};
use colored::*;
use serde_json;
use std::io::Write;

#[derive(Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    Markdown,
    Terminal,
}

pub trait OutputWriter {
    fn write_report(&mut self, report: &PostureReport) -> anyhow::Result<()>;
}

pub struct JsonWriter<W: Write> {
    writer: W,
}

impl<W: Write> JsonWriter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }
}

impl<W: Write> OutputWriter for JsonWriter<W> {
    fn write_report(&mut self, report: &PostureReport) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(report)?;
        self.writer.write_all(json.as_bytes())?;
        Ok(())
    }
}

pub struct MarkdownWriter<W: Write> {
    writer: W,
}

impl<W: Write> MarkdownWriter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }
}

impl<W: Write> OutputWriter for MarkdownWriter<W> {
    fn write_report(&mut self, report: &PostureReport) -> anyhow::Result<()> {
        self.write_header(report)?;
        self.write_secure_score(report)?;
        self.write_product_deployment(report)?;
        self.write_exposure(report)?;
        self.write_user_risk(report)?;
        self.write_device_risk(report)?;
        self.write_incidents(report)?;
        Ok(())
    }
}

impl<W: Write> MarkdownWriter<W> {
    fn write_header(&mut self, report: &PostureReport) -> anyhow::Result<()> {
        writeln!(self.writer, "# Security Posture Report")?;
        writeln!(self.writer)?;
        writeln!(
            self.writer,
            "Generated: {}",
            report.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
        )?;
        writeln!(self.writer)?;
        Ok(())
    }

    fn write_secure_score(&mut self, report: &PostureReport) -> anyhow::Result<()> {
        let score = &report.secure_score;
        writeln!(self.writer, "## Secure Score")?;
        writeln!(self.writer)?;
        writeln!(
            self.writer,
            "Overall: {:.1}% completed, {:.1}% to address",
            score.overall_completed_pct, score.overall_to_address_pct
        )?;
        writeln!(self.writer)?;
        writeln!(self.writer, "| Category | Completed % | To Address % |")?;
        writeln!(self.writer, "|----------|-------------|--------------|")?;
        for category in &score.categories {
            writeln!(
                self.writer,
                "| {} | {:.1} | {:.1} |",
                category.category, category.completed_pct, category.to_address_pct
            )?;
        }
        writeln!(self.writer)?;

        if !score.top_actions.is_empty() {
            writeln!(self.writer, "### Actions to Prioritize")?;
            writeln!(self.writer)?;
            for action in &score.top_actions {
                writeln!(
                    self.writer,
                    "- [ ] {} ({}, +{:.0} points)",
                    action.recommended_action, action.category, action.difference
                )?;
            }
            writeln!(self.writer)?;
        }
        Ok(())
    }

    fn write_product_deployment(&mut self, report: &PostureReport) -> anyhow::Result<()> {
        if report.product_deployment.is_empty() {
            return Ok(());
        }
        writeln!(self.writer, "## Product Deployment")?;
        writeln!(self.writer)?;
        writeln!(self.writer, "| Product | Deployment % |")?;
        writeln!(self.writer, "|---------|--------------|")?;
        for product in &report.product_deployment {
            writeln!(
                self.writer,
                "| {} | {:.1} |",
                product.product, product.deployment_pct
            )?;
        }
        writeln!(self.writer)?;
        Ok(())
    }

    fn write_exposure(&mut self, report: &PostureReport) -> anyhow::Result<()> {
        let exposure = &report.exposure;
        writeln!(self.writer, "## Exposure")?;
        writeln!(self.writer)?;
        writeln!(
            self.writer,
            "{} recommendations ({} active), average score impact {:.2}",
            exposure.total_recommendations,
            exposure.active_recommendations,
            exposure.exposure_score_avg
        )?;
        writeln!(self.writer)?;
        for recommendation in &exposure.top_recommendations {
            writeln!(
                self.writer,
                "- {} (impact {:.2})",
                recommendation.recommendation,
                recommendation.impact.unwrap_or(0.0)
            )?;
        }
        writeln!(self.writer)?;
        Ok(())
    }

    fn write_user_risk(&mut self, report: &PostureReport) -> anyhow::Result<()> {
        let user_risk = &report.user_risk;
        writeln!(self.writer, "## User Risk")?;
        writeln!(self.writer)?;
        writeln!(
            self.writer,
            "{} at-risk detections across {} users",
            user_risk.total_at_risk_detections,
            user_risk.users.len()
        )?;
        writeln!(self.writer)?;
        if !user_risk.top_users.is_empty() {
            writeln!(
                self.writer,
                "| User | UPN | Detections | Most Prominent |"
            )?;
            writeln!(self.writer, "|------|-----|------------|----------------|")?;
            for user in &user_risk.top_users {
                writeln!(
                    self.writer,
                    "| {} | {} | {} | {} |",
                    user.user,
                    user.upn,
                    user.incident_count,
                    user.most_prominent_detection.as_deref().unwrap_or("-")
                )?;
            }
            writeln!(self.writer)?;
        }
        Ok(())
    }

    fn write_device_risk(&mut self, report: &PostureReport) -> anyhow::Result<()> {
        let device_risk = &report.device_risk;
        writeln!(self.writer, "## Device Risk")?;
        writeln!(self.writer)?;
        writeln!(
            self.writer,
            "{} active / {} inactive devices, {} high-risk active",
            device_risk.active_count,
            device_risk.inactive_count,
            device_risk.high_risk_active_count
        )?;
        writeln!(self.writer)?;
        for device in &device_risk.high_risk_active {
            writeln!(self.writer, "- {} (high risk)", device.device_name)?;
        }
        writeln!(self.writer)?;
        Ok(())
    }

    fn write_incidents(&mut self, report: &PostureReport) -> anyhow::Result<()> {
        let incidents = &report.incidents;
        writeln!(self.writer, "## Incidents")?;
        writeln!(self.writer)?;
        for (severity, count) in &incidents.severity_counts {
            writeln!(self.writer, "- {}: {}", severity, count)?;
        }
        writeln!(self.writer)?;

        if !incidents.edges.is_empty() {
            writeln!(self.writer, "### Correlated Risk")?;
            writeln!(self.writer)?;
            for edge in &incidents.edges {
                match edge {
                    CorrelationEdge::User {
                        incident_name,
                        identity,
                        risk_level,
                    } => writeln!(
                        self.writer,
                        "- `{}` touches user {} (risk level {})",
                        incident_name, identity, risk_level
                    )?,
                    CorrelationEdge::Device {
                        incident_name,
                        device_name,
                        risk_level,
                    } => writeln!(
                        self.writer,
                        "- `{}` touches device {} (risk level {})",
                        incident_name, device_name, risk_level
                    )?,
                }
            }
            writeln!(self.writer)?;
        }
        Ok(())
    }
}

pub struct TerminalWriter;

impl Default for TerminalWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl TerminalWriter {
    pub fn new() -> Self {
        Self
    }
}

impl OutputWriter for TerminalWriter {
    fn write_report(&mut self, report: &PostureReport) -> anyhow::Result<()> {
        print_header();
        print_secure_score(report);
        print_exposure(report);
        print_risk_summary(report);
        print_correlation(report);
        Ok(())
    }
}

fn print_header() {
    println!("{}", "Security Posture Report".bold().blue());
    println!("{}", "=======================".blue());
    println!();
}

fn print_secure_score(report: &PostureReport) {
    let score = &report.secure_score;
    println!("{} Secure Score:", "📊".bold());
    println!(
        "  Overall: {} completed",
        format!("{:.1}%", score.overall_completed_pct).green()
    );
    for category in &score.categories {
        println!(
            "  {}: {:.1}% completed, {:.1}% to address",
            category.category, category.completed_pct, category.to_address_pct
        );
    }
    println!();
}

fn print_exposure(report: &PostureReport) {
    let exposure = &report.exposure;
    println!(
        "{} Exposure: {} recommendations, {} active, avg impact {}",
        "⚠️".yellow(),
        exposure.total_recommendations,
        exposure.active_recommendations,
        format!("{:.2}", exposure.exposure_score_avg).yellow()
    );
    println!();
}

fn print_risk_summary(report: &PostureReport) {
    println!(
        "{} High-risk users: {}",
        "🔧".bold(),
        report.user_risk.users.len().to_string().red()
    );
    report
        .user_risk
        .top_users
        .iter()
        .take(5)
        .for_each(|user| {
            println!(
                "  - {} ({} detections, {})",
                user.upn.yellow(),
                user.incident_count,
                user.most_prominent_detection.as_deref().unwrap_or("-")
            );
        });
    println!(
        "  High-risk active devices: {}",
        report
            .device_risk
            .high_risk_active_count
            .to_string()
            .red()
    );
    println!();
}

fn print_correlation(report: &PostureReport) {
    let edges = &report.incidents.edges;
    if edges.is_empty() {
        println!(
            "{} No incidents touch independently-flagged entities",
            "✓".green()
        );
        return;
    }

    println!(
        "{} Correlated risk ({} edges):",
        "✗".red(),
        edges.len()
    );
    edges.iter().take(10).for_each(|edge| match edge {
        CorrelationEdge::User {
            incident_name,
            identity,
            ..
        } => println!("  - {} -> user {}", incident_name, identity.red()),
        CorrelationEdge::Device {
            incident_name,
            device_name,
            ..
        } => println!("  - {} -> device {}", incident_name, device_name.red()),
    });
}

pub fn create_writer(format: OutputFormat) -> Box<dyn OutputWriter> {
    match format {
        OutputFormat::Json => Box::new(JsonWriter::new(std::io::stdout())),
        OutputFormat::Markdown => Box::new(MarkdownWriter::new(std::io::stdout())),
        OutputFormat::Terminal => Box::new(TerminalWriter::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzers::analyze_posture;
    use crate::config::RiskmapConfig;
    use crate::core::{Dataset, TableSet};

    fn empty_tables() -> TableSet {
        let dataset = |name: &str, columns: &[&str]| {
            Dataset::new(
                name,
                columns.iter().map(|c| c.to_string()).collect(),
                vec![],
            )
        };
        TableSet {
            secure_score: Some(dataset(
                "secure_score",
                crate::analyzers::secure_score::REQUIRED_COLUMNS,
            )),
            exposure: Some(dataset(
                "exposure",
                crate::analyzers::exposure::REQUIRED_COLUMNS,
            )),
            user_detections: Some(dataset(
                "user_detections",
                crate::analyzers::user_risk::REQUIRED_COLUMNS,
            )),
            devices: Some(dataset(
                "devices",
                crate::analyzers::device_risk::REQUIRED_COLUMNS,
            )),
            incidents: Some(dataset(
                "incidents",
                crate::analyzers::incidents::REQUIRED_COLUMNS,
            )),
        }
    }

    #[test]
    fn json_writer_round_trips_the_report() {
        let report = analyze_posture(&empty_tables(), &RiskmapConfig::default()).unwrap();

        let mut buffer = Vec::new();
        JsonWriter::new(&mut buffer).write_report(&report).unwrap();

        let parsed: PostureReport = serde_json::from_slice(&buffer).unwrap();
        assert_eq!(parsed.secure_score.overall_completed_pct, 0.0);
        assert!(parsed.incidents.edges.is_empty());
    }

    #[test]
    fn markdown_writer_emits_every_section() {
        let report = analyze_posture(&empty_tables(), &RiskmapConfig::default()).unwrap();

        let mut buffer = Vec::new();
        MarkdownWriter::new(&mut buffer)
            .write_report(&report)
            .unwrap();
        let output = String::from_utf8(buffer).unwrap();

        assert!(output.contains("# Security Posture Report"));
        assert!(output.contains("## Secure Score"));
        assert!(output.contains("## Exposure"));
        assert!(output.contains("## User Risk"));
        assert!(output.contains("## Device Risk"));
        assert!(output.contains("## Incidents"));
    }
}
