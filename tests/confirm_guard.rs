use page_behaviors::{
    BehaviorConfig, ClickOutcome, DEFAULT_CONFIRM_MESSAGE, FormSubmission, Harness, Result,
};

const ORDERS: &str = r#"
    <table id="orders">
      <tr id="row-7">
        <td><a id="open" href="/orders/7">Comanda #7</a></td>
        <td><a id="delete" href="/orders/7/delete" data-confirm="Ștergi comanda #7?">Șterge</a></td>
        <td><a id="archive" href="/orders/7/archive" data-confirm>Arhivează</a></td>
        <td><a id="icon-link" href="/orders/7/cancel" data-confirm="Anulezi?"><span id="icon">x</span></a></td>
      </tr>
    </table>
    <form id="purge" action="/orders/purge" method="post">
      <button id="purge-btn" type="submit" data-confirm="Ștergi toate comenzile?">Golește</button>
    </form>
    "#;

fn declined() -> Option<ClickOutcome> {
    Some(ClickOutcome {
        default_prevented: true,
        propagation_stopped: true,
    })
}

fn untouched() -> Option<ClickOutcome> {
    Some(ClickOutcome {
        default_prevented: false,
        propagation_stopped: false,
    })
}

#[test]
fn declining_blocks_navigation_and_bubbling() -> Result<()> {
    let mut harness = Harness::from_html(ORDERS)?;
    harness.observe_clicks("window")?;
    harness.enqueue_confirm_response(false);

    harness.click("#delete")?;
    assert_eq!(harness.take_confirm_messages(), vec!["Ștergi comanda #7?"]);
    assert_eq!(harness.last_click(), declined());
    assert!(harness.take_navigations().is_empty());
    assert!(harness.take_observed_clicks().is_empty());
    Ok(())
}

#[test]
fn accepting_lets_the_click_through() -> Result<()> {
    let mut harness = Harness::from_html(ORDERS)?;
    harness.observe_clicks("window")?;
    harness.enqueue_confirm_response(true);

    harness.click("#delete")?;
    assert_eq!(harness.last_click(), untouched());
    assert_eq!(harness.take_navigations(), vec!["/orders/7/delete"]);
    assert_eq!(harness.take_observed_clicks(), vec!["window"]);
    Ok(())
}

#[test]
fn empty_attribute_prompts_with_the_default_message() -> Result<()> {
    let mut harness = Harness::from_html(ORDERS)?;
    harness.click("#archive")?;
    assert_eq!(harness.take_confirm_messages(), vec![DEFAULT_CONFIRM_MESSAGE]);
    assert_eq!(DEFAULT_CONFIRM_MESSAGE, "Ești sigur?");
    Ok(())
}

#[test]
fn unmarked_links_never_prompt() -> Result<()> {
    let mut harness = Harness::from_html(ORDERS)?;
    harness.set_default_confirm_response(false);
    harness.click("#open")?;
    assert!(harness.take_confirm_messages().is_empty());
    assert_eq!(harness.take_navigations(), vec!["/orders/7"]);
    Ok(())
}

#[test]
fn only_the_literal_click_target_is_checked() -> Result<()> {
    let mut harness = Harness::from_html(ORDERS)?;
    harness.set_default_confirm_response(false);

    harness.click("#icon")?;
    assert!(harness.take_confirm_messages().is_empty());
    assert_eq!(harness.take_navigations(), vec!["/orders/7/cancel"]);

    harness.click("#icon-link")?;
    assert_eq!(harness.take_confirm_messages(), vec!["Anulezi?"]);
    assert!(harness.take_navigations().is_empty());
    Ok(())
}

#[test]
fn declining_a_submit_button_blocks_the_form() -> Result<()> {
    let mut harness = Harness::from_html(ORDERS)?;
    harness.enqueue_confirm_response(false);
    harness.click("#purge-btn")?;
    assert!(harness.take_form_submissions().is_empty());

    harness.enqueue_confirm_response(true);
    harness.click("#purge-btn")?;
    assert_eq!(
        harness.take_form_submissions(),
        vec![FormSubmission {
            form_id: Some("purge".into()),
            action: Some("/orders/purge".into()),
            submitter_id: Some("purge-btn".into()),
        }]
    );
    Ok(())
}

#[test]
fn ancestors_below_the_document_see_the_click_before_the_prompt() -> Result<()> {
    let mut harness = Harness::from_html(ORDERS)?;
    harness.observe_clicks("#orders")?;
    harness.observe_clicks("window")?;
    harness.enqueue_confirm_response(false);

    harness.click("#delete")?;
    assert_eq!(harness.take_observed_clicks(), vec!["#orders"]);
    Ok(())
}

#[test]
fn each_click_asks_again() -> Result<()> {
    let mut harness = Harness::from_html(ORDERS)?;
    harness.enqueue_confirm_response(false);
    harness.enqueue_confirm_response(true);

    harness.click("#delete")?;
    harness.click("#delete")?;
    assert_eq!(harness.take_confirm_messages().len(), 2);
    assert_eq!(harness.take_navigations(), vec!["/orders/7/delete"]);
    Ok(())
}

#[test]
fn custom_default_message_is_used() -> Result<()> {
    let mut config = BehaviorConfig::default();
    config.set_default_confirm_message("Are you sure?")?;
    let mut harness = Harness::from_html_with_config(ORDERS, config)?;
    harness.click("#archive")?;
    assert_eq!(harness.take_confirm_messages(), vec!["Are you sure?"]);
    Ok(())
}

#[test]
fn disabled_guard_never_prompts() -> Result<()> {
    let mut config = BehaviorConfig::default();
    config.set_confirm_enabled(false);
    let mut harness = Harness::from_html_with_config(ORDERS, config)?;
    harness.set_default_confirm_response(false);
    harness.click("#delete")?;
    assert!(harness.take_confirm_messages().is_empty());
    assert_eq!(harness.take_navigations(), vec!["/orders/7/delete"]);
    Ok(())
}

#[test]
fn disabled_attribute_on_a_link_does_not_suppress_the_prompt() -> Result<()> {
    let html = r#"<a id="stale" href="/orders/7/delete" disabled data-confirm="Sure?">x</a>"#;
    let mut harness = Harness::from_html(html)?;
    harness.set_default_confirm_response(false);

    harness.click("#stale")?;
    assert_eq!(harness.take_confirm_messages(), vec!["Sure?"]);
    assert_eq!(harness.last_click(), declined());
    assert!(harness.take_navigations().is_empty());

    harness.set_default_confirm_response(true);
    harness.click("#stale")?;
    assert_eq!(harness.take_navigations(), vec!["/orders/7/delete"]);
    Ok(())
}

#[test]
fn controls_in_a_disabled_fieldset_are_not_clicked() -> Result<()> {
    let html = r#"
        <form id="bulk" action="/orders/bulk">
          <fieldset disabled>
            <button id="bulk-delete" data-confirm="Ștergi tot?">Șterge</button>
          </fieldset>
        </form>
        "#;
    let mut harness = Harness::from_html(html)?;
    harness.click("#bulk-delete")?;
    assert!(harness.take_confirm_messages().is_empty());
    assert!(harness.take_form_submissions().is_empty());
    assert_eq!(harness.last_click(), None);
    Ok(())
}
