/// Renders stored post content through the ammonia whitelist.
///
/// Safe formatting tags (<b>, <p>, <a href>) survive; <script>, <iframe>
/// and event-handler attributes are stripped together with script bodies.
pub fn clean_html(input: &str) -> String {
    ammonia::clean(input)
}
