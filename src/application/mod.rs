// ============================================================
// Layer 2 — Application / Use Cases
// ============================================================
// Orchestrates the other layers into one fine-tuning run:
// load → tokenize → train → evaluate.
//
// Rules for this layer:
//   - No ML math or model code here
//   - No console formatting here (that's Layer 1 and infra)
//   - No direct file parsing (that's Layer 4 and 6)
//   - Only workflow coordination
//
// Reference: Clean Architecture pattern
//            Rust Book §7 (Module System)

// The fine-tuning workflow and its configuration
pub mod finetune_use_case;
