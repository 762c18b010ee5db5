//! Fixed instruction text sent with every assessment request

/// Market data the adjuster prompt grounds its pricing in. Kept inline so a
/// prompt revision and its pricing context always ship together.
const INDIAN_MARKET_CONTEXT: &str = r#"
# INDIAN AUTOMOTIVE MARKET CONTEXT - 2025 BASELINE

## 1. MARKET ARCHITECTURE & LABOR TIERS
Pricing depends heavily on the "Workshop Tier".
- **Tier A (Authorized Dealerships - OEM):**
    - Use brand-new Genuine parts only.
    - Standardized Oven Paint.
    - Highest labor rates.
- **Tier B (Premium Multi-Brand Workshops):**
    - Mix of Genuine and High-grade OEM/OES parts.
    - Baked Paint methodology.
    - Target: Out-of-warranty vehicles requiring quality work.
- **Tier C (Local Garages / Roadside Mechanics):**
    - Manual craftsmanship. Air-drying paints.
    - Use Used/Salvage parts or low-grade aftermarket parts.

### Labor Rates Reference (INR)
| Service | Tier C (Local) | Tier B (Premium) | Tier A (Dealership) |
| :--- | :--- | :--- | :--- |
| **Denting (Per Panel 4W)** | 500 - 1,000 | 1,200 - 2,000 | 2,500 - 4,000 |
| **Paint (Per Panel 4W)**   | 1,500 - 2,500 | 3,000 - 4,500 | 5,000 - 8,000 |
| **2W/Scooter Body Panel Replacement Labor** | 150 - 300 | 300 - 500 | 500 - 800 |
| **3W Body/Sheet Metal Labor** | 500 - 800 | 1,000 - 1,500 | 1,500 - 2,500 |

## 2. MULTI-VEHICLE DATA MATRIX (APX PRICES IN INR)

### 2W (SCOOTERS / BIKES - e.g., Hero Vida, Honda Activa, Splendor)
- Common Damages: Front Panel (Nose), Side Panels, Mudguard, Visor.
- Plastic panels on scooters are usually replaced rather than dented.

| Part | Genuine (INR) | Aftermarket (INR) |
| :--- | :--- | :--- |
| **Scooter Front Panel** | 1,200 - 1,800 | 600 - 900 |
| **Scooter Side Panel (Set)**| 1,800 - 2,500 | 1,000 - 1,400 |
| **Scooter Mudguard** | 600 - 900 | 300 - 500 |
| **Bike Fuel Tank** | 3,500 - 5,000 | 1,500 - 2,500 |
| **Bike Visor/Headlight Assy**| 1,500 - 2,500 | 800 - 1,200 |

### 3W (AUTO RICKSHAWS - e.g., Bajaj RE, Piaggio Ape)
- Sheet metal body, prone to dents and scratches.
- Windshield and fabric hood repairs are common.

| Part | Genuine (INR) | Aftermarket (INR) |
| :--- | :--- | :--- |
| **3W Front Windshield** | 2,500 - 3,500 | 1,500 - 2,000 |
| **3W Headlight (Pair)** | 800 - 1,200 | 400 - 600 |

### 4W (CARS - e.g., Maruti Suzuki Swift, Hyundai Creta, Tata Nexon)
- **Maruti Suzuki / Tata:** High availability of OE parts.
- **Hyundai / Kia:** Marginally higher part costs.

| Part | Genuine (INR) | Aftermarket (INR) | Used/Salvage (INR) |
| :--- | :--- | :--- | :--- |
| **Swift Front Bumper** | 2,500 - 3,500 | 1,200 - 1,800 | 800 - 1,200 |
| **Creta Headlight (LED)**| 18,000 - 25,000 | NIL | 10,000 - 14,000 |
| **Nexon Tailgate** | 12,000 - 16,000 | N/A | 8,000 - 10,000 |
| **Swift Side Mirror** | 3,500 - 5,000 | 1,500 - 2,000 | 1,000 - 1,500 |

## 3. CONTEXTUAL HEURISTICS & FRAUD LOGIC
1.  **Vehicle Type Classification:** Ensure the AI accurately distinguishes between 2W (Scooters/Bikes), 3W (Auto Rickshaws), and 4W (Cars, SUVs).
2.  **Fraud Detection ("fraud_risk"):**
    - High: Mismatched vehicle parts, signs of extreme rust on "new" damage, inconsistent damage patterns (e.g., severe structural damage with no exterior panel damage).
    - Low: Standard, consistent scrape/dent patterns.
3.  **Cost Basis:** Default the "bestOptionTotal" to **Genuine** parts for Tier A logic unless otherwise directed, as insurance claims primarily use Genuine parts.
"#;

/// Build the full adjuster instruction sent alongside the image
pub(crate) fn analysis_prompt() -> String {
    format!(
        r#"
Act as a Senior Automotive Insurance Adjuster and Appraiser based in India.

Analyze the provided image to create a highly accurate damage assessment report tailored for the Indian market, specifically handling 2W (Scooters/Bikes), 3W (Auto Rickshaws), and 4W (Cars/SUVs).

**MARKET DATA & PRICING CONTEXT (STRICTLY FOLLOW THIS):**
{INDIAN_MARKET_CONTEXT}

**STEP 1: VEHICLE IDENTIFICATION**
* Identify whether the vehicle is a **"Scooter" (2W), "Bike" (2W), "3-Wheeler" (3W), or "Car/SUV" (4W)**.
* Output this precisely as the `vehicleType`.

**STEP 2: DAMAGE ANALYSIS & PRICING (IN INR)**
* Identify all visible damages.
* **Classify Category**: For each damage, classify it as either "Cosmetic" (scratches, light paint chips, superficial dents) or "Functional" (cracks, broken structural parts, shattered glass, misalignment affecting operation).
* **Fraud Detection ("fraudRisk")**:
  - Analyze the image for anomalies (e.g., rust on "fresh" damage, completely mismatched parts, impossible damage angles).
  - Assign a fraud risk: "Low", "Medium", or "High".
* **Cost Estimation (Detailed Breakdown Required)**:
  - For each damage, determine **Labor Cost** based on tier.
  - For Parts, provide THREE options where applicable:
    1. **Genuine**: New from Dealership.
    2. **Aftermarket**: New Copy.
    3. **Used/Salvage**: Original used part.
  - Select the **"bestOptionTotal"** based on standard Indian consumer/insurance behavior (usually Genuine for new insurances, Aftermarket for out-of-pocket).

**STEP 3: OUTPUT**
* Provide the "vehicleType" as the specific vehicle category (e.g., "Scooter", "Car").
* Return strict JSON matching the supplied response schema.
* For every damage include "box_2d" as [ymin, xmin, ymax, xmax] on a 0-1000 scale.
* Ensure "totalEstimatedCost" is the sum of all "estimatedCost" fields. All values must be in INR.
"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_embeds_the_market_context() {
        let prompt = analysis_prompt();
        assert!(prompt.contains("Senior Automotive Insurance Adjuster"));
        assert!(prompt.contains("INDIAN AUTOMOTIVE MARKET CONTEXT"));
        assert!(prompt.contains("bestOptionTotal"));
        assert!(prompt.contains("box_2d"));
    }
}
