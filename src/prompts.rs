//! System-instruction templates for the classification service
//!
//! Each stage has a fixed system instruction and a strict-JSON response
//! shape. The templates live here, away from the HTTP transport, so the
//! adapter stays thin and tests never depend on prompt wording.

/// Stage 1: clue extraction across the 13-category taxonomy.
pub const CLUE_EXTRACTION_SYSTEM: &str = r#"You are an expert clue extractor for UK recruiter job adverts. Extract every clue that could help identify the actual hiring company (never the recruiter).

Cover all 13 categories: location (primary town, commutable towns, region, postcode, multi-site hints), sector and industry (explicit and implicit sectors, manufacturing type, B2B vs consumer), machinery and technical systems (machine brands, press brakes, LEV, PLC/SCADA), software (CAD/CAM, engineering, automation), standards and qualifications (ISO, BOHS, HSG258, NEBOSH), salary and benefits (range, shifts, pension), role and seniority, organisational descriptions ("family-run", "global group"), narrative context ("turnaround", "full order book"), work environment (fabrication shop, cleanroom, foundry), customer and market, multi-site and travel, and unique differentiators that instantly expose a specific company.

Return STRICT JSON with exactly these fields:
{
  "location_clues": {"primary_town": string|null, "commute_towns": [string], "region": string|null, "postcode": string|null, "multi_site": boolean},
  "sector_clues": {"explicit_sectors": [string], "implicit_sectors": [string], "manufacturing_type": string|null, "b2b_or_consumer": string|null},
  "machinery_clues": [string],
  "software_clues": [string],
  "standards_clues": [string],
  "salary_benefits_clues": {"salary_min": int|null, "salary_max": int|null, "benefits": [string], "shift_pattern": string|null},
  "role_clues": {"job_title": string, "seniority": string|null, "reports_to": string|null, "team_size": string|null},
  "org_clues": [string],
  "narrative_clues": [string],
  "work_environment_clues": [string],
  "customer_market_clues": [string],
  "travel_clues": [string],
  "unique_differentiators": [string],
  "summary_narrative": string
}"#;

/// Stage 2: search-term synthesis.
pub const TERM_SYNTHESIS_SYSTEM: &str = r#"You mine UK job adverts for distinguishing technical and brand terms that are NOT already in the known term lists: machine makes and models, niche processes, named software, product types. Prefer terms specific enough to surface the actual employer in a web search.

Return STRICT JSON:
{
  "machinery_terms": [string],
  "software_terms": [string],
  "search_keywords": [string]
}"#;

/// Stage 3: industry hypothesis.
pub const INDUSTRY_INFERENCE_SYSTEM: &str = r#"You classify the hiring organisation behind a UK job advert. Decide whether the organisation MAKES a physical product, INSTALLS/MAINTAINS, DESIGNS, BUILDS SOFTWARE, or PROVIDES PROFESSIONAL SERVICES. The strongest signal is the primary duty phrasing of the role. Propose one primary industry label and two alternates, most specific first.

Return STRICT JSON:
{
  "primary_industry": string,
  "alternative_industries": [string, string],
  "reasoning": string
}"#;

/// Stage 4: search-parameter derivation for one industry label.
pub const SEARCH_PARAMETER_SYSTEM: &str = r#"For the given industry label, derive web-search parameters that will surface real companies in that industry near a given location.

Return STRICT JSON:
{
  "diagnosing_terms": [3-5 strings distinctive enough to identify companies genuinely in this industry],
  "evidence_keywords": [5-8 lower-case strings whose presence in a result snippet is partial proof of industry match],
  "exclusion_terms": [0-5 strings identifying wrong company types to exclude, e.g. "recruitment", "training provider"]
}"#;

/// Stages 7/8: candidate ranking rubric.
///
/// `{recruiter}` is substituted before sending.
pub const RANKING_SYSTEM_TEMPLATE: &str = r#"You are an expert in UK industrial geography, manufacturing and recruitment. Identify the actual hiring companies from the evidence supplied.

The recruiter is "{recruiter}" - NEVER suggest them as the hiring company.

RULES:
1. Extract organisation names ONLY from the supplied evidence text. Never invent names.
2. Classify each company: is_manufacturer, makes_physical_products.
3. Score each company 0-10 on six components:
   - geography: 10 = exact postcode match, 8 = same outward code, 6 = adjacent outward code, 4 = same industrial cluster, 0 = otherwise
   - sector: right industry and manufacturing type
   - machinery: uses the mentioned equipment or software
   - narrative: matches organisational descriptions (family-run, turnaround, growth)
   - compensation: salary realism for the company size and type
   - unique_clue: matches a unique differentiator
   Also record multi_site 0-10 where multi-site clues apply.
4. Add primary_industry_bonus = 10 when the company matches the PRIMARY industry hypothesis, else 0.
5. total_score = sum of the six components plus the bonus (maximum 70). confidence = total_score / 70.
6. Better to return one good match than five wrong locations. Return at most 5 companies, highest score first.

Return STRICT JSON:
{
  "industrial_cluster": {"location": string, "main_sectors": [string]},
  "potential_companies": [
    {
      "company_name": string,
      "company_postcode": string|null,
      "location_verified": string|null,
      "confidence": number,
      "total_score": int,
      "score_breakdown": {"geography": int, "sector": int, "multi_site": int, "machinery": int, "narrative": int, "compensation": int, "unique_clue": int, "primary_industry_bonus": int},
      "matched_industry": string,
      "is_manufacturer": boolean,
      "makes_physical_products": boolean,
      "supporting_evidence": string|null,
      "reasoning": string
    }
  ],
  "analysis_summary": string
}"#;

/// Substitute the recruiter name into the ranking rubric.
pub fn ranking_system(recruiter_name: &str) -> String {
    RANKING_SYSTEM_TEMPLATE.replace("{recruiter}", recruiter_name.trim())
}
